//! The two-call surface handed to host bindings.

use std::path::PathBuf;
use std::sync::Arc;

use crate::models::config::RecorderConfig;
use crate::models::error::CaptureError;
use crate::models::state::CaptureState;
use crate::session::recording::RecordingSession;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::recorder_observer::RecorderObserver;

/// Microphone recorder facade.
///
/// `start_recording` and `stop_recording` map 1:1 onto the session's
/// `start`/`stop`. Share it behind an `Arc` (or host-managed state); all
/// methods take `&self`.
pub struct MicRecorder<B: CaptureBackend> {
    session: RecordingSession<B>,
}

impl<B: CaptureBackend> MicRecorder<B> {
    pub fn new(backend: B, config: RecorderConfig) -> Result<Self, CaptureError> {
        Ok(Self {
            session: RecordingSession::new(backend, config)?,
        })
    }

    /// Register an observer for state changes and asynchronous stream
    /// failures.
    pub fn with_observer(mut self, observer: Arc<dyn RecorderObserver>) -> Self {
        self.session.set_observer(observer);
        self
    }

    pub fn start_recording(&self) -> Result<(), CaptureError> {
        self.session.start().map(|_| ())
    }

    /// Returns the path of the finished recording.
    pub fn stop_recording(&self) -> Result<PathBuf, CaptureError> {
        self.session.stop().map(|result| result.file_path)
    }

    pub fn state(&self) -> CaptureState {
        self.session.state()
    }

    /// Full session API, for callers that want the recording details.
    pub fn session(&self) -> &RecordingSession<B> {
        &self.session
    }
}
