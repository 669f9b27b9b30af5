use thiserror::Error;

/// Errors surfaced by the recorder.
///
/// Every facade call resolves to `Ok` or exactly one of these kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no input device available: {0}")]
    DeviceUnavailable(String),

    #[error("microphone access denied")]
    PermissionDenied,

    #[error("no supported input configuration: {0}")]
    FormatNegotiationFailed(String),

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("capture stream failed: {0}")]
    StreamFailure(String),

    #[error("failed to write recording: {0}")]
    EncodeIo(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        Self::EncodeIo(err.to_string())
    }
}
