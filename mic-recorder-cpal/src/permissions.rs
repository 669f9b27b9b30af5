//! Classification of audio-backend failures into recorder errors.
//!
//! cpal surfaces OS access denial as backend-specific error text (ALSA
//! `EACCES`, PulseAudio "Access denied", CoreAudio "not authorized"), so
//! permission problems are recognized by message.

use mic_recorder_core::CaptureError;

const DENIAL_MARKERS: &[&str] = &[
    "permission",
    "access denied",
    "access is denied",
    "not authorized",
    "not permitted",
    "eacces",
    "eperm",
];

/// Where in the open sequence a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStage {
    /// Querying default or supported configurations.
    ConfigQuery,
    /// Building or starting the input stream.
    StreamStart,
}

/// Whether a backend error message indicates the OS refused microphone access.
pub fn is_permission_denial(message: &str) -> bool {
    let message = message.to_lowercase();
    DENIAL_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Map a backend failure to the recorder error for that stage.
pub fn classify(message: &str, device_missing: bool, stage: OpenStage) -> CaptureError {
    if is_permission_denial(message) {
        return CaptureError::PermissionDenied;
    }
    if device_missing {
        return CaptureError::DeviceUnavailable(message.to_string());
    }
    match stage {
        OpenStage::ConfigQuery => CaptureError::FormatNegotiationFailed(message.to_string()),
        OpenStage::StreamStart => CaptureError::StreamFailure(message.to_string()),
    }
}

pub(crate) fn default_config_error(err: cpal::DefaultStreamConfigError) -> CaptureError {
    let missing = matches!(err, cpal::DefaultStreamConfigError::DeviceNotAvailable);
    classify(&err.to_string(), missing, OpenStage::ConfigQuery)
}

pub(crate) fn supported_configs_error(err: cpal::SupportedStreamConfigsError) -> CaptureError {
    let missing = matches!(err, cpal::SupportedStreamConfigsError::DeviceNotAvailable);
    classify(&err.to_string(), missing, OpenStage::ConfigQuery)
}

pub(crate) fn build_stream_error(err: cpal::BuildStreamError) -> CaptureError {
    let missing = matches!(err, cpal::BuildStreamError::DeviceNotAvailable);
    classify(&err.to_string(), missing, OpenStage::StreamStart)
}

pub(crate) fn play_stream_error(err: cpal::PlayStreamError) -> CaptureError {
    let missing = matches!(err, cpal::PlayStreamError::DeviceNotAvailable);
    classify(&err.to_string(), missing, OpenStage::StreamStart)
}
