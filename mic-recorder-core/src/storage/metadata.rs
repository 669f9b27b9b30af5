use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;

/// Sidecar location: `<recording stem>.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<PathBuf, CaptureError> {
    let path = metadata_path(recording_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::EncodeIo(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| CaptureError::EncodeIo(format!("failed to write metadata: {}", e)))?;
    Ok(path)
}

/// Read recording metadata from its JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(recording_path))
        .map_err(|e| CaptureError::EncodeIo(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CaptureError::EncodeIo(format!("failed to parse metadata: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_models::{DeviceFormat, SampleFormat};

    #[test]
    fn sidecar_sits_next_to_recording() {
        let dir = tempfile::tempdir().unwrap();
        let recording = dir.path().join("20240101000000_abc.wav");
        let format = DeviceFormat::new(44100, 2, SampleFormat::I16);
        let metadata = RecordingMetadata::new(&recording.to_string_lossy(), "Built-in Mic", format, 441, "00");

        let written = write_metadata(&metadata, &recording).unwrap();
        assert_eq!(written, dir.path().join("20240101000000_abc.metadata.json"));
        assert_eq!(read_metadata(&recording).unwrap(), metadata);
    }

    #[test]
    fn missing_sidecar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_metadata(&dir.path().join("none.wav")).unwrap_err();
        assert!(matches!(err, CaptureError::EncodeIo(_)));
    }
}
