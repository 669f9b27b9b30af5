//! cpal input stream driven from a dedicated capture thread.
//!
//! `cpal::Stream` is not `Send` on every platform, so it is built, played
//! and dropped on one named thread. The control side talks to that thread
//! over two channels: a rendezvous channel for the startup outcome and a
//! stop channel whose disconnection ends the capture.

use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender};

use mic_recorder_core::{
    CaptureError, CaptureStream, DeviceInfo, InputDevice, PcmSample, SampleProducer, StreamFaultSignal,
};

use crate::permissions;

/// A resolved cpal input device with its negotiated format.
pub struct CpalInputDevice {
    device: cpal::Device,
    info: DeviceInfo,
    /// Sample type the device delivers; `info.format` is what gets stored.
    native: cpal::SampleFormat,
}

impl CpalInputDevice {
    pub(crate) fn new(device: cpal::Device, info: DeviceInfo, native: cpal::SampleFormat) -> Self {
        Self { device, info, native }
    }
}

impl InputDevice for CpalInputDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn start(
        self: Box<Self>,
        producer: SampleProducer,
        faults: StreamFaultSignal,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let CpalInputDevice { device, info, native } = *self;
        let (ready_tx, ready_rx) = bounded::<Result<(), CaptureError>>(0);
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let name = info.name.clone();

        let handle = thread::Builder::new()
            .name("mic-capture".into())
            .spawn(move || capture_thread(device, info, native, producer, faults, ready_tx, stop_rx))
            .map_err(|e| CaptureError::StreamFailure(format!("failed to spawn capture thread: {}", e)))?;

        let started = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(CaptureError::StreamFailure("capture thread exited during startup".into())));

        match started {
            Ok(()) => {
                log::debug!("Capture stream running on '{}'", name);
                Ok(Box::new(CpalCaptureStream {
                    stop_tx: Some(stop_tx),
                    handle: Some(handle),
                }))
            }
            Err(e) => {
                let _ = handle.join();
                Err(e)
            }
        }
    }
}

fn capture_thread(
    device: cpal::Device,
    info: DeviceInfo,
    native: cpal::SampleFormat,
    producer: SampleProducer,
    faults: StreamFaultSignal,
    ready_tx: Sender<Result<(), CaptureError>>,
    stop_rx: Receiver<()>,
) {
    let stream = match build_and_play(&device, &info, native, producer, faults) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };
    if ready_tx.send(Ok(())).is_err() {
        return;
    }

    // Blocks until `stop` sends or the stream handle is dropped.
    let _ = stop_rx.recv();
    drop(stream);
    log::debug!("Capture stream on '{}' released", info.name);
}

fn build_and_play(
    device: &cpal::Device,
    info: &DeviceInfo,
    native: cpal::SampleFormat,
    producer: SampleProducer,
    faults: StreamFaultSignal,
) -> Result<cpal::Stream, CaptureError> {
    let config = cpal::StreamConfig {
        channels: info.format.channels,
        sample_rate: cpal::SampleRate(info.format.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = match native {
        cpal::SampleFormat::I8 => build_typed::<i8>(device, &config, producer, faults),
        cpal::SampleFormat::U8 => build_typed::<u8>(device, &config, producer, faults),
        cpal::SampleFormat::I16 => build_typed::<i16>(device, &config, producer, faults),
        cpal::SampleFormat::I32 => build_typed::<i32>(device, &config, producer, faults),
        cpal::SampleFormat::F32 => build_typed::<f32>(device, &config, producer, faults),
        other => {
            return Err(CaptureError::FormatNegotiationFailed(format!(
                "no capture path for sample format {:?}",
                other
            )))
        }
    }
    .map_err(permissions::build_stream_error)?;

    stream.play().map_err(permissions::play_stream_error)?;
    Ok(stream)
}

fn build_typed<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut producer: SampleProducer,
    faults: StreamFaultSignal,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: PcmSample + cpal::SizedSample,
{
    let channels = config.channels as usize;
    let data_faults = faults.clone();
    let mut misaligned = false;

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            deliver(data, channels, &mut producer, &data_faults, &mut misaligned);
        },
        move |err| faults.raise(err.to_string()),
        None,
    )
}

/// Data-callback body: hand whole-frame buffers to the sink.
///
/// The first buffer that is not a whole number of frames raises a fault,
/// and nothing from that buffer on is pushed.
fn deliver<T: PcmSample>(
    data: &[T],
    channels: usize,
    producer: &mut SampleProducer,
    faults: &StreamFaultSignal,
    misaligned: &mut bool,
) {
    if *misaligned {
        return;
    }
    if !is_whole_frames(data.len(), channels) {
        *misaligned = true;
        faults.raise(format!(
            "received {} samples, not a whole number of {}-channel frames",
            data.len(),
            channels
        ));
        return;
    }
    producer.push_samples(data);
}

fn is_whole_frames(samples: usize, channels: usize) -> bool {
    channels > 0 && samples % channels == 0
}

/// Handle to a running capture thread. Stops it on drop.
pub struct CpalCaptureStream {
    stop_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CpalCaptureStream {
    fn shutdown(&mut self) -> Result<(), CaptureError> {
        // Disconnecting the stop channel wakes the capture thread.
        self.stop_tx.take();
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| CaptureError::StreamFailure("capture thread panicked".into())),
            None => Ok(()),
        }
    }
}

impl CaptureStream for CpalCaptureStream {
    fn stop(mut self: Box<Self>) -> Result<(), CaptureError> {
        self.shutdown()
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Capture stream did not shut down cleanly: {}", e);
        }
    }
}
