use serde::{Deserialize, Serialize};

/// Linear PCM sample encodings the recorder can persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Unsigned 8-bit, midpoint 128 (the only 8-bit layout WAV allows).
    U8,
    I16,
    I32,
    F32,
}

impl SampleFormat {
    pub fn bits_per_sample(self) -> u16 {
        match self {
            Self::U8 => 8,
            Self::I16 => 16,
            Self::I32 | Self::F32 => 32,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits_per_sample() as usize / 8
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }

    /// WAVE `fmt ` format tag: 1 = integer PCM, 3 = IEEE float.
    pub fn wav_format_tag(self) -> u16 {
        if self.is_float() {
            3
        } else {
            1
        }
    }
}

/// Negotiated stream layout. Fixed for the lifetime of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_format: SampleFormat,
}

impl DeviceFormat {
    pub fn new(sample_rate: u32, channels: u16, sample_format: SampleFormat) -> Self {
        Self {
            sample_rate,
            channels,
            sample_format,
        }
    }

    /// Size of one interleaved frame (one sample per channel).
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * self.sample_format.bytes_per_sample()
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.bytes_per_frame() as u32
    }
}

/// An opened input device and the format it was negotiated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub format: DeviceFormat,
}

/// A Rust sample type that maps 1:1 onto a persisted `SampleFormat`.
///
/// Implementations serialize to the container's little-endian byte order.
pub trait PcmSample: Copy + Send + 'static {
    const FORMAT: SampleFormat;

    fn extend_le_bytes(self, out: &mut Vec<u8>);
}

impl PcmSample for u8 {
    const FORMAT: SampleFormat = SampleFormat::U8;

    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.push(self);
    }
}

/// Signed 8-bit input, stored in WAV's unsigned 8-bit layout by flipping the
/// sign bit. Lossless.
impl PcmSample for i8 {
    const FORMAT: SampleFormat = SampleFormat::U8;

    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.push((self as u8) ^ 0x80);
    }
}

impl PcmSample for i16 {
    const FORMAT: SampleFormat = SampleFormat::I16;

    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl PcmSample for i32 {
    const FORMAT: SampleFormat = SampleFormat::I32;

    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl PcmSample for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;

    fn extend_le_bytes(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// One callback's worth of interleaved frames, already in container byte order.
///
/// The sequence number is stamped by the `SampleProducer` at push time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    pub(crate) sequence: u64,
    frames: usize,
    data: Vec<u8>,
}

impl SampleBuffer {
    /// Serialize interleaved samples. Trailing samples that do not fill a
    /// whole frame are kept in `data` but not counted in `frames`.
    pub fn from_samples<T: PcmSample>(samples: &[T], channels: u16) -> Self {
        let mut data = Vec::with_capacity(samples.len() * T::FORMAT.bytes_per_sample());
        for &sample in samples {
            sample.extend_le_bytes(&mut data);
        }
        Self {
            sequence: 0,
            frames: samples.len() / channels.max(1) as usize,
            data,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len_bytes(&self) -> usize {
        self.data.len()
    }
}
