//! Scripted capture backend for exercising the session without hardware.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use mic_recorder_core::{
    CaptureBackend, CaptureError, CaptureState, CaptureStream, DeviceFormat, DeviceInfo, InputDevice,
    RecorderObserver, RecordingResult, SampleFormat, SampleProducer, StreamFaultSignal,
};

#[derive(Default)]
pub struct Shared {
    pub opens: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub frames_pushed: AtomicU64,
    open_error: Mutex<Option<CaptureError>>,
    start_error: Mutex<Option<CaptureError>>,
    producer: Mutex<Option<SampleProducer>>,
    faults: Mutex<Option<StreamFaultSignal>>,
    fault_on_stop: Mutex<Option<String>>,
    auto_feed: AtomicBool,
    leak_producer: AtomicBool,
}

/// Backend whose stream is fed by the test (or by a pusher thread in
/// auto-feed mode).
#[derive(Clone)]
pub struct ScriptedBackend {
    pub shared: Arc<Shared>,
    format: DeviceFormat,
}

impl ScriptedBackend {
    pub fn new(format: DeviceFormat) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            format,
        }
    }

    pub fn stereo_i16() -> Self {
        Self::new(DeviceFormat::new(48000, 2, SampleFormat::I16))
    }

    /// Deliver one callback's worth of interleaved samples.
    pub fn feed(&self, samples: &[i16]) {
        let mut producer = self.shared.producer.lock();
        let producer = producer.as_mut().expect("no stream running");
        assert!(producer.push_samples(samples));
        self.shared
            .frames_pushed
            .fetch_add((samples.len() / self.format.channels as usize) as u64, Ordering::SeqCst);
    }

    pub fn fault(&self, reason: &str) {
        let faults = self.shared.faults.lock().clone().expect("no stream running");
        faults.raise(reason);
    }

    pub fn fail_next_open(&self, error: CaptureError) {
        *self.shared.open_error.lock() = Some(error);
    }

    pub fn fail_next_start(&self, error: CaptureError) {
        *self.shared.start_error.lock() = Some(error);
    }

    /// The next stream stop raises a fault before releasing its producer.
    pub fn fault_during_stop(&self, reason: &str) {
        *self.shared.fault_on_stop.lock() = Some(reason.to_string());
    }

    /// Streams push continuously from their own thread until stopped.
    pub fn auto_feed(&self) {
        self.shared.auto_feed.store(true, Ordering::SeqCst);
    }

    /// Streams keep their producer after stop, as a misbehaving backend would.
    pub fn leak_producer_on_stop(&self) {
        self.shared.leak_producer.store(true, Ordering::SeqCst);
    }

    pub fn opens(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    pub fn frames_pushed(&self) -> u64 {
        self.shared.frames_pushed.load(Ordering::SeqCst)
    }
}

impl CaptureBackend for ScriptedBackend {
    fn open_default_input(&self) -> Result<Box<dyn InputDevice>, CaptureError> {
        if let Some(error) = self.shared.open_error.lock().take() {
            return Err(error);
        }
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedDevice {
            info: DeviceInfo {
                id: "scripted-0".into(),
                name: "Scripted Mic".into(),
                is_default: true,
                format: self.format,
            },
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct ScriptedDevice {
    info: DeviceInfo,
    shared: Arc<Shared>,
}

impl InputDevice for ScriptedDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn start(
        self: Box<Self>,
        mut producer: SampleProducer,
        faults: StreamFaultSignal,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        if let Some(error) = self.shared.start_error.lock().take() {
            return Err(error);
        }
        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        *self.shared.faults.lock() = Some(faults);

        let mut worker = None;
        if self.shared.auto_feed.load(Ordering::SeqCst) {
            let running = Arc::new(AtomicBool::new(true));
            let shared = Arc::clone(&self.shared);
            let flag = Arc::clone(&running);
            let channels = self.info.format.channels as usize;
            let handle = thread::spawn(move || {
                let mut value: i16 = 0;
                while flag.load(Ordering::SeqCst) {
                    let frames = 1 + (value as usize % 64);
                    let samples: Vec<i16> = (0..frames * channels).map(|i| value.wrapping_add(i as i16)).collect();
                    producer.push_samples(&samples);
                    shared.frames_pushed.fetch_add(frames as u64, Ordering::SeqCst);
                    value = value.wrapping_add(1);
                    if value % 16 == 0 {
                        thread::yield_now();
                    }
                }
            });
            worker = Some((running, handle));
        } else {
            *self.shared.producer.lock() = Some(producer);
        }

        Ok(Box::new(ScriptedStream {
            shared: self.shared,
            worker,
        }))
    }
}

struct ScriptedStream {
    shared: Arc<Shared>,
    worker: Option<(Arc<AtomicBool>, thread::JoinHandle<()>)>,
}

impl CaptureStream for ScriptedStream {
    fn stop(self: Box<Self>) -> Result<(), CaptureError> {
        if let Some(reason) = self.shared.fault_on_stop.lock().take() {
            let faults = self.shared.faults.lock().clone();
            if let Some(faults) = faults {
                faults.raise(reason);
            }
        }
        drop(self);
        Ok(())
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        if let Some((running, handle)) = self.worker.take() {
            running.store(false, Ordering::SeqCst);
            let _ = handle.join();
        }
        if !self.shared.leak_producer.load(Ordering::SeqCst) {
            self.shared.producer.lock().take();
        }
        self.shared.faults.lock().take();
        self.shared.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Observer that records every notification.
#[derive(Default)]
pub struct RecordingObserver {
    pub states: Mutex<Vec<CaptureState>>,
    pub failures: Mutex<Vec<CaptureError>>,
    pub finished: Mutex<Vec<PathBuf>>,
}

impl RecorderObserver for RecordingObserver {
    fn on_state_changed(&self, state: CaptureState) {
        self.states.lock().push(state);
    }

    fn on_stream_failure(&self, error: &CaptureError) {
        self.failures.lock().push(error.clone());
    }

    fn on_recording_finished(&self, result: &RecordingResult) {
        self.finished.lock().push(result.file_path.clone());
    }
}

/// Every `.wav` file in `dir`.
pub fn wav_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "wav").unwrap_or(false))
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub const SHORT: Duration = Duration::from_millis(20);
