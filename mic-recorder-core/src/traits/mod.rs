pub mod capture_backend;
pub mod recorder_observer;
