use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::CaptureState;

/// Event observer for recorder notifications.
///
/// `on_stream_failure` fires on the audio subsystem's thread, the others on
/// the thread that called into the recorder. Implementations should return
/// quickly and marshal to their own thread if needed.
///
/// `on_state_changed` and `on_stream_failure` must not call back into the
/// recorder. State changes are reported while the lifecycle lock is held,
/// and a `stop` issued from the audio thread would wait on that same thread
/// to exit. Hand the work to another thread instead.
pub trait RecorderObserver: Send + Sync {
    /// Called when the recorder state changes.
    fn on_state_changed(&self, state: CaptureState);

    /// Called once when the capture stream faults mid-recording.
    fn on_stream_failure(&self, error: &CaptureError);

    /// Called when a recording has been written and published, after the
    /// recorder is idle again. May call back into the recorder.
    fn on_recording_finished(&self, result: &RecordingResult);
}
