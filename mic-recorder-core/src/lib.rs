//! # mic-recorder-core
//!
//! Platform-agnostic microphone recording engine.
//!
//! Captures samples handed over from a real-time audio callback, and on stop
//! writes them to a WAV file whose path is returned to the caller. Audio
//! backends implement `CaptureBackend` and plug into `RecordingSession`.
//!
//! ## Architecture
//!
//! ```text
//! mic-recorder-core (this crate)
//! ├── traits/       ← CaptureBackend, InputDevice, CaptureStream, RecorderObserver
//! ├── models/       ← CaptureError, CaptureState, RecorderConfig, DeviceFormat, SampleBuffer, etc.
//! ├── processing/   ← SampleProducer/SampleConsumer hand-off, WAV header layout
//! ├── session/      ← RecordingSession state machine, StreamFaultSignal
//! ├── storage/      ← WavEncoder, output paths, metadata sidecar
//! └── recorder      ← MicRecorder facade (start_recording / stop_recording)
//! ```

pub mod models;
pub mod processing;
pub mod recorder;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{DeviceFormat, DeviceInfo, PcmSample, SampleBuffer, SampleFormat};
pub use models::config::RecorderConfig;
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::CaptureState;
pub use processing::sample_sink::{sample_sink, SampleConsumer, SampleProducer};
pub use processing::wav_format::WavHeader;
pub use recorder::MicRecorder;
pub use session::fault::StreamFaultSignal;
pub use session::recording::RecordingSession;
pub use storage::wav_writer::{EncodedRecording, WavEncoder};
pub use traits::capture_backend::{CaptureBackend, CaptureStream, InputDevice};
pub use traits::recorder_observer::RecorderObserver;
