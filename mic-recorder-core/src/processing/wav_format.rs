/// WAV container layout.
///
/// Recordings use the canonical 44-byte RIFF header: one 16-byte `fmt `
/// chunk followed directly by the `data` chunk. All fields little-endian.
use crate::models::audio_models::DeviceFormat;

/// Size of the RIFF/WAVE header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Largest payload whose sizes still fit the 32-bit RIFF fields.
pub const MAX_DATA_LEN: u64 = u32::MAX as u64 - (WAV_HEADER_SIZE as u64 - 8);

/// Header fields of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavHeader {
    pub fn for_format(format: &DeviceFormat, data_len: u32) -> Self {
        Self {
            format_tag: format.sample_format.wav_format_tag(),
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.sample_format.bits_per_sample(),
            data_len,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Serialize the header.
    ///
    /// Layout:
    /// ```text
    /// [0-3]    "RIFF"
    /// [4-7]    36 + data_len
    /// [8-11]   "WAVE"
    /// [12-15]  "fmt "
    /// [16-19]  16
    /// [20-21]  format tag (1 = PCM, 3 = IEEE float)
    /// [22-23]  channels
    /// [24-27]  sample_rate
    /// [28-31]  byte_rate
    /// [32-33]  block_align
    /// [34-35]  bits_per_sample
    /// [36-39]  "data"
    /// [40-43]  data_len
    /// ```
    pub fn to_bytes(&self) -> [u8; WAV_HEADER_SIZE] {
        let mut header = [0u8; WAV_HEADER_SIZE];

        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&self.data_len.saturating_add(36).to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");

        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes());
        header[20..22].copy_from_slice(&self.format_tag.to_le_bytes());
        header[22..24].copy_from_slice(&self.channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        header[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        header[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());

        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&self.data_len.to_le_bytes());

        header
    }

    /// Parse a header written by [`WavHeader::to_bytes`].
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(format!("header too short: {} bytes", bytes.len()));
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err("not a RIFF/WAVE file".into());
        }
        if &bytes[12..16] != b"fmt " || read_u32(bytes, 16) != 16 {
            return Err("unexpected fmt chunk".into());
        }
        if &bytes[36..40] != b"data" {
            return Err("data chunk does not follow fmt chunk".into());
        }

        let header = Self {
            format_tag: read_u16(bytes, 20),
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            bits_per_sample: read_u16(bytes, 34),
            data_len: read_u32(bytes, 40),
        };
        let riff_len = header
            .data_len
            .checked_add(36)
            .ok_or_else(|| format!("data length {} exceeds the RIFF size limit", header.data_len))?;
        if read_u32(bytes, 4) != riff_len {
            return Err("RIFF size disagrees with data length".into());
        }
        Ok(header)
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
