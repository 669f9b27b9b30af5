use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::DeviceInfo;
use crate::models::config::RecorderConfig;
use crate::models::error::CaptureError;
use crate::models::recording_result::{duration_secs, RecordingMetadata, RecordingResult};
use crate::models::state::CaptureState;
use crate::processing::sample_sink::{sample_sink, SampleConsumer};
use crate::session::fault::StreamFaultSignal;
use crate::storage::metadata;
use crate::storage::wav_writer::WavEncoder;
use crate::traits::capture_backend::{CaptureBackend, CaptureStream};
use crate::traits::recorder_observer::RecorderObserver;

/// Resources held while a recording is in progress.
///
/// Dropping it drops the stream, which stops capture on every exit path.
struct ActiveCapture {
    device: DeviceInfo,
    stream: Box<dyn CaptureStream>,
    consumer: SampleConsumer,
    faults: StreamFaultSignal,
}

/// Recording lifecycle for one input device at a time.
///
/// Generic over the audio backend via `CaptureBackend`. Data flow:
/// ```text
/// [InputDevice] → [CaptureStream callback] → [SampleProducer]
///                                                  ↓
///                 stop(): halt stream → [SampleConsumer::drain] → [WavEncoder] → path
/// ```
///
/// Every transition happens under the `active` lock, so concurrent
/// `start()`/`stop()` calls apply one at a time. `state` is a separate,
/// briefly held lock that the stream fault path can update without waiting
/// on a transition.
pub struct RecordingSession<B: CaptureBackend> {
    backend: B,
    config: RecorderConfig,
    encoder: WavEncoder,
    active: Mutex<Option<ActiveCapture>>,
    state: Arc<Mutex<CaptureState>>,
    observer: Option<Arc<dyn RecorderObserver>>,
}

impl<B: CaptureBackend> RecordingSession<B> {
    pub fn new(backend: B, config: RecorderConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfiguration)?;
        let encoder = WavEncoder::new(config.output_directory.clone());
        Ok(Self {
            backend,
            config,
            encoder,
            active: Mutex::new(None),
            state: Arc::new(Mutex::new(CaptureState::Idle)),
            observer: None,
        })
    }

    pub fn set_observer(&mut self, observer: Arc<dyn RecorderObserver>) {
        self.observer = Some(observer);
    }

    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Device of the recording in progress, if any.
    pub fn current_device(&self) -> Option<DeviceInfo> {
        self.active.lock().as_ref().map(|a| a.device.clone())
    }

    /// Buffers captured but not yet drained.
    pub fn pending_buffers(&self) -> usize {
        self.active
            .lock()
            .as_ref()
            .map(|a| a.consumer.pending())
            .unwrap_or(0)
    }

    /// Open the input device and start capturing. Transitions: idle → recording.
    ///
    /// On failure nothing is left allocated and the state stays idle.
    pub fn start(&self) -> Result<DeviceInfo, CaptureError> {
        let mut active = self.active.lock();
        if active.is_some() {
            log::warn!("start() rejected: recording already in progress");
            return Err(CaptureError::AlreadyRecording);
        }

        let device = self.backend.open_default_input()?;
        let info = device.info().clone();
        log::info!(
            "Opened input device '{}': {} Hz, {} channels, {:?}",
            info.name,
            info.format.sample_rate,
            info.format.channels,
            info.format.sample_format
        );

        let (producer, consumer) = sample_sink(info.format.channels);
        let faults = StreamFaultSignal::new(Arc::clone(&self.state), self.observer.clone());

        // Recording before the first callback, so an immediate fault lands
        // on a recording session.
        self.set_state(CaptureState::Recording);

        let stream = match device.start(producer, faults.clone()) {
            Ok(stream) => stream,
            Err(e) => {
                log::error!("Failed to start capture stream: {}", e);
                self.set_state(CaptureState::Idle);
                return Err(e);
            }
        };

        *active = Some(ActiveCapture {
            device: info.clone(),
            stream,
            consumer,
            faults,
        });
        log::info!("Recording started");
        Ok(info)
    }

    /// Stop capturing and write the recording.
    /// Transitions: recording → stopping → idle, or errored → idle.
    ///
    /// Blocks until the stream is torn down, the sink drained, and the file
    /// published. A stream fault during the recording is returned here as
    /// `StreamFailure` and no file is written.
    pub fn stop(&self) -> Result<RecordingResult, CaptureError> {
        let result = {
            let mut active = self.active.lock();
            let Some(capture) = active.take() else {
                return Err(CaptureError::NotRecording);
            };
            let result = self.finish(capture);
            self.set_state(CaptureState::Idle);
            result
        };

        // Lifecycle lock released: the observer may call back into the session.
        match &result {
            Ok(recording) => {
                log::info!(
                    "Recording saved: {} ({:.2}s)",
                    recording.file_path.display(),
                    recording.duration_secs
                );
                if let Some(ref observer) = self.observer {
                    observer.on_recording_finished(recording);
                }
            }
            Err(e) => log::error!("Recording failed: {}", e),
        }
        result
    }

    fn finish(&self, capture: ActiveCapture) -> Result<RecordingResult, CaptureError> {
        let ActiveCapture {
            device,
            stream,
            consumer,
            faults,
        } = capture;

        self.enter_stopping();

        // The stream must be fully stopped before draining, or late
        // callbacks could append after the drain.
        let stopped = stream.stop();
        if let Some(fault) = faults.take() {
            return Err(fault);
        }
        stopped?;

        let buffers = consumer.drain(self.config.drain_timeout)?;
        let encoded = self.encoder.encode(&buffers, &device.format)?;

        let file_path = encoded.path.to_string_lossy().into_owned();
        let metadata = RecordingMetadata::new(
            &file_path,
            &device.name,
            device.format,
            encoded.frame_count,
            &encoded.checksum,
        );
        if self.config.write_metadata {
            if let Err(e) = metadata::write_metadata(&metadata, &encoded.path) {
                log::warn!("Recording kept without metadata sidecar: {}", e);
            }
        }

        Ok(RecordingResult {
            file_path: encoded.path,
            frame_count: encoded.frame_count,
            data_len: encoded.data_len,
            duration_secs: duration_secs(encoded.frame_count, device.format.sample_rate),
            format: device.format,
            checksum: encoded.checksum,
            metadata,
        })
    }

    fn enter_stopping(&self) {
        let entered = {
            let mut state = self.state.lock();
            if state.is_recording() {
                *state = CaptureState::Stopping;
                true
            } else {
                false
            }
        };
        if entered {
            if let Some(ref observer) = self.observer {
                observer.on_state_changed(CaptureState::Stopping);
            }
        }
    }

    fn set_state(&self, new_state: CaptureState) {
        *self.state.lock() = new_state;
        if let Some(ref observer) = self.observer {
            observer.on_state_changed(new_state);
        }
    }
}

impl<B: CaptureBackend> Drop for RecordingSession<B> {
    fn drop(&mut self) {
        if self.active.get_mut().take().is_some() {
            log::warn!("Recorder dropped mid-recording; captured audio discarded");
        }
    }
}
