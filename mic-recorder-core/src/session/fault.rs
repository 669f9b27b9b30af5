use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::state::CaptureState;
use crate::traits::recorder_observer::RecorderObserver;

/// Channel for a capture stream to report a hardware fault.
///
/// Raised from the audio subsystem's error path. The first fault wins and is
/// held until the session's `stop()` collects it. Raising moves a
/// `Recording` session to `Errored` and notifies the observer.
///
/// Locks taken here are never held by the control side across blocking
/// work, so raising cannot stall behind a `stop()` in progress.
#[derive(Clone)]
pub struct StreamFaultSignal {
    shared: Arc<FaultShared>,
}

struct FaultShared {
    fault: Mutex<Option<CaptureError>>,
    state: Option<Arc<Mutex<CaptureState>>>,
    observer: Option<Arc<dyn RecorderObserver>>,
}

impl StreamFaultSignal {
    pub(crate) fn new(
        state: Arc<Mutex<CaptureState>>,
        observer: Option<Arc<dyn RecorderObserver>>,
    ) -> Self {
        Self {
            shared: Arc::new(FaultShared {
                fault: Mutex::new(None),
                state: Some(state),
                observer,
            }),
        }
    }

    /// A signal not attached to any session.
    pub fn detached() -> Self {
        Self {
            shared: Arc::new(FaultShared {
                fault: Mutex::new(None),
                state: None,
                observer: None,
            }),
        }
    }

    /// Report a stream failure.
    pub fn raise(&self, reason: impl Into<String>) {
        let error = CaptureError::StreamFailure(reason.into());
        {
            let mut slot = self.shared.fault.lock();
            if slot.is_some() {
                log::debug!("Ignoring subsequent stream fault: {}", error);
                return;
            }
            *slot = Some(error.clone());
        }

        log::error!("Capture stream fault: {}", error);

        let errored = match &self.shared.state {
            Some(state) => {
                let mut state = state.lock();
                if state.is_recording() {
                    *state = CaptureState::Errored;
                    true
                } else {
                    false
                }
            }
            None => false,
        };

        if let Some(ref observer) = self.shared.observer {
            if errored {
                observer.on_state_changed(CaptureState::Errored);
            }
            observer.on_stream_failure(&error);
        }
    }

    pub fn is_raised(&self) -> bool {
        self.shared.fault.lock().is_some()
    }

    pub(crate) fn take(&self) -> Option<CaptureError> {
        self.shared.fault.lock().take()
    }
}
