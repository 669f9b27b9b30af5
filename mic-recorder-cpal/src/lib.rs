//! # mic-recorder-cpal
//!
//! cpal input backend for mic-recorder.
//!
//! Provides:
//! - `CpalBackend`: host/device resolution and format negotiation
//! - `CpalInputDevice` / `CpalCaptureStream`: capture on a dedicated `mic-capture` thread
//! - `permissions`: mapping of backend failures to `PermissionDenied` and friends
//! - `RecorderExt`: one-call construction of a cpal-backed `MicRecorder`
//!
//! ## Usage
//! ```no_run
//! use mic_recorder_core::RecorderConfig;
//! use mic_recorder_cpal::{CpalRecorder, RecorderExt};
//!
//! let recorder = CpalRecorder::with_default_backend(RecorderConfig::default())?;
//! recorder.start_recording()?;
//! // ...
//! let path = recorder.stop_recording()?;
//! println!("saved {}", path.display());
//! # Ok::<(), mic_recorder_core::CaptureError>(())
//! ```

pub mod config;
pub mod cpal_stream;
pub mod device_enumerator;
pub mod negotiation;
pub mod permissions;

pub use config::CpalBackendConfig;
pub use cpal_stream::{CpalCaptureStream, CpalInputDevice};
pub use device_enumerator::CpalBackend;

use mic_recorder_core::{CaptureError, MicRecorder, RecorderConfig};

/// A recorder capturing through cpal.
pub type CpalRecorder = MicRecorder<CpalBackend>;

/// Constructors for a cpal-backed recorder.
pub trait RecorderExt: Sized {
    /// Default host and default input device.
    fn with_default_backend(config: RecorderConfig) -> Result<Self, CaptureError> {
        Self::with_backend_config(config, CpalBackendConfig::default())
    }

    fn with_backend_config(config: RecorderConfig, backend: CpalBackendConfig) -> Result<Self, CaptureError>;
}

impl RecorderExt for CpalRecorder {
    fn with_backend_config(config: RecorderConfig, backend: CpalBackendConfig) -> Result<Self, CaptureError> {
        MicRecorder::new(CpalBackend::new(backend)?, config)
    }
}
