pub mod fault;
pub mod recording;
