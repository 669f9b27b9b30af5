//! Stream format negotiation.
//!
//! Works on plain descriptions of what a device reports so the choice can be
//! tested without audio hardware. `device_enumerator` converts cpal's
//! configs into these types.

use mic_recorder_core::{CaptureError, DeviceFormat, SampleFormat};

/// Rate tried when the target rate falls outside a supported range.
const SECONDARY_SAMPLE_RATE: u32 = 48_000;

/// The device's reported default configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportedDefault {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_format: cpal::SampleFormat,
}

/// One supported configuration range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRange {
    pub channels: u16,
    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
    pub sample_format: cpal::SampleFormat,
}

impl ConfigRange {
    fn contains(&self, rate: u32) -> bool {
        (self.min_sample_rate..=self.max_sample_rate).contains(&rate)
    }
}

/// Outcome of negotiation: what the file records and what the device delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub format: DeviceFormat,
    /// Sample type the stream callback receives.
    pub native: cpal::SampleFormat,
}

/// Map a cpal sample format onto one the encoder can write.
///
/// Signed 8-bit input is stored as unsigned 8-bit, the WAV layout for that
/// width, and re-biased in the stream callback.
pub fn map_sample_format(format: cpal::SampleFormat) -> Option<SampleFormat> {
    match format {
        cpal::SampleFormat::U8 | cpal::SampleFormat::I8 => Some(SampleFormat::U8),
        cpal::SampleFormat::I16 => Some(SampleFormat::I16),
        cpal::SampleFormat::I32 => Some(SampleFormat::I32),
        cpal::SampleFormat::F32 => Some(SampleFormat::F32),
        _ => None,
    }
}

/// Pick the stream format to capture with.
///
/// The device default wins when it is encodable. Otherwise the supported
/// ranges are ranked by sample format (`I16`, `F32`, `I32`, `U8`, `I8`) and
/// then channel count (`preferred_channels`, the other of mono/stereo,
/// anything else), and a rate is chosen inside the winning range.
pub fn negotiate(
    default: Option<ReportedDefault>,
    ranges: &[ConfigRange],
    fallback_sample_rate: u32,
    preferred_channels: u16,
) -> Result<NegotiatedFormat, CaptureError> {
    if let Some(d) = default {
        if let Some(sample_format) = map_sample_format(d.sample_format) {
            if d.channels > 0 && d.sample_rate > 0 {
                return Ok(NegotiatedFormat {
                    format: DeviceFormat::new(d.sample_rate, d.channels, sample_format),
                    native: d.sample_format,
                });
            }
        }
    }

    let best = ranges
        .iter()
        .filter(|r| r.channels > 0 && r.min_sample_rate <= r.max_sample_rate)
        .filter_map(|r| map_sample_format(r.sample_format).map(|f| (r, f)))
        .min_by_key(|(r, _)| (format_rank(r.sample_format), channel_rank(r.channels, preferred_channels)))
        .ok_or_else(|| {
            CaptureError::FormatNegotiationFailed("no supported input configuration with an encodable sample format".into())
        })?;

    let (range, sample_format) = best;
    let target = default.map(|d| d.sample_rate).filter(|&r| r > 0).unwrap_or(fallback_sample_rate);
    let sample_rate = if range.contains(target) {
        target
    } else if range.contains(SECONDARY_SAMPLE_RATE) {
        SECONDARY_SAMPLE_RATE
    } else {
        target.clamp(range.min_sample_rate, range.max_sample_rate)
    };

    Ok(NegotiatedFormat {
        format: DeviceFormat::new(sample_rate, range.channels, sample_format),
        native: range.sample_format,
    })
}

fn format_rank(format: cpal::SampleFormat) -> u8 {
    match format {
        cpal::SampleFormat::I16 => 0,
        cpal::SampleFormat::F32 => 1,
        cpal::SampleFormat::I32 => 2,
        cpal::SampleFormat::U8 => 3,
        _ => 4,
    }
}

fn channel_rank(channels: u16, preferred: u16) -> u8 {
    if channels == preferred {
        0
    } else if channels == 1 || channels == 2 {
        1
    } else {
        2
    }
}
