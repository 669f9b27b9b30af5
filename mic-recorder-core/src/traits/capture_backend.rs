use crate::models::audio_models::DeviceInfo;
use crate::models::error::CaptureError;
use crate::processing::sample_sink::SampleProducer;
use crate::session::fault::StreamFaultSignal;

/// Source of input devices.
///
/// Implemented by:
/// - `CpalBackend` (mic-recorder-cpal)
/// - scripted backends in tests
pub trait CaptureBackend: Send + Sync {
    /// Resolve the configured (or default) input device and negotiate its
    /// stream format.
    ///
    /// Errors: `DeviceUnavailable`, `PermissionDenied`,
    /// `FormatNegotiationFailed`.
    fn open_default_input(&self) -> Result<Box<dyn InputDevice>, CaptureError>;
}

/// An opened input device whose format is fixed.
pub trait InputDevice: Send {
    fn info(&self) -> &DeviceInfo;

    /// Begin delivering buffers into `producer`.
    ///
    /// The data callback must only call `producer.push*`. Hardware errors
    /// reported while streaming go to `faults`. The returned stream owns
    /// the producer; dropping the producer is how the stream acknowledges
    /// that delivery has ended.
    fn start(
        self: Box<Self>,
        producer: SampleProducer,
        faults: StreamFaultSignal,
    ) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// A running capture stream.
///
/// Dropping a stream without calling `stop` must also stop it.
pub trait CaptureStream: Send {
    /// Halt delivery. Blocks until no further data callback can run and the
    /// producer has been released.
    fn stop(self: Box<Self>) -> Result<(), CaptureError>;
}
