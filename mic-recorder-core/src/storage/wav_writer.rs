use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::audio_models::{DeviceFormat, SampleBuffer};
use crate::models::error::CaptureError;
use crate::processing::wav_format::{WavHeader, MAX_DATA_LEN};
use crate::storage::paths;

/// A recording that has been fully written and published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecording {
    pub path: PathBuf,
    pub frame_count: u64,
    pub data_len: u64,
    pub checksum: String,
}

/// Writes drained sample buffers as a WAV file.
///
/// ## File Format
/// ```text
/// [44-byte WAV header]
/// [interleaved little-endian PCM, buffers in push order]
/// ```
///
/// The payload size is known before the first byte is written, so the
/// header is final on creation. Bytes go to a hidden `.part` sibling that is
/// synced and renamed into place; a failed encode leaves nothing behind.
#[derive(Debug, Clone)]
pub struct WavEncoder {
    output_directory: PathBuf,
}

impl WavEncoder {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Encode into a freshly generated path in the output directory.
    pub fn encode(&self, buffers: &[SampleBuffer], format: &DeviceFormat) -> Result<EncodedRecording, CaptureError> {
        let path = paths::generate_recording_path(&self.output_directory)
            .map_err(|e| CaptureError::EncodeIo(format!("failed to prepare output directory: {}", e)))?;
        self.encode_to(buffers, format, &path)
    }

    /// Encode to an explicit destination, replacing any file already there.
    pub fn encode_to(
        &self,
        buffers: &[SampleBuffer],
        format: &DeviceFormat,
        path: &Path,
    ) -> Result<EncodedRecording, CaptureError> {
        let data_len = payload_len(buffers, format)?;
        let header = WavHeader::for_format(format, data_len as u32);

        let part = paths::partial_path(path);
        let checksum = match write_file(&part, &header, buffers) {
            Ok(checksum) => checksum,
            Err(e) => {
                let _ = fs::remove_file(&part);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&part, path) {
            let _ = fs::remove_file(&part);
            return Err(CaptureError::EncodeIo(format!("failed to publish recording: {}", e)));
        }

        let frame_count = data_len / format.bytes_per_frame() as u64;
        log::debug!(
            "Wrote {} frames ({} bytes) to {}",
            frame_count,
            data_len,
            path.display()
        );

        Ok(EncodedRecording {
            path: path.to_path_buf(),
            frame_count,
            data_len,
            checksum,
        })
    }
}

/// Total payload size, checked against the format and the RIFF size limit.
fn payload_len(buffers: &[SampleBuffer], format: &DeviceFormat) -> Result<u64, CaptureError> {
    if format.channels == 0 || format.sample_rate == 0 {
        return Err(CaptureError::EncodeIo(format!(
            "invalid stream format: {} Hz, {} channels",
            format.sample_rate, format.channels
        )));
    }

    let data_len: u64 = buffers.iter().map(|b| b.len_bytes() as u64).sum();
    if data_len > MAX_DATA_LEN {
        return Err(CaptureError::EncodeIo(format!(
            "recording of {} bytes exceeds the WAV size limit",
            data_len
        )));
    }
    if data_len % format.bytes_per_frame() as u64 != 0 {
        return Err(CaptureError::EncodeIo(format!(
            "payload of {} bytes is not a whole number of {}-byte frames",
            data_len,
            format.bytes_per_frame()
        )));
    }
    Ok(data_len)
}

fn write_file(path: &Path, header: &WavHeader, buffers: &[SampleBuffer]) -> Result<String, CaptureError> {
    let file = File::create(path)
        .map_err(|e| CaptureError::EncodeIo(format!("failed to create file: {}", e)))?;
    let mut writer = HashingWriter::new(BufWriter::new(file));

    writer.write_all(&header.to_bytes())?;
    for buffer in buffers {
        writer.write_all(buffer.data())?;
    }

    let (inner, checksum) = writer.finish();
    let file = inner
        .into_inner()
        .map_err(|e| CaptureError::EncodeIo(format!("flush failed: {}", e.error())))?;
    file.sync_all()?;
    Ok(checksum)
}

/// Forwards writes and hashes exactly the bytes that were accepted.
struct HashingWriter<W: Write> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    fn finish(self) -> (W, String) {
        (self.inner, hex_encode(&self.hasher.finalize()))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
