use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::audio_models::DeviceFormat;

/// Result returned when a recording stops successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub frame_count: u64,
    /// Payload size in bytes, as recorded in the header.
    pub data_len: u64,
    pub duration_secs: f64,
    pub format: DeviceFormat,
    /// SHA-256 of the complete file, lowercase hex.
    pub checksum: String,
    pub metadata: RecordingMetadata,
}

/// Serializable description of a finished recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: String,
    pub device_name: String,
    pub format: DeviceFormat,
    pub frame_count: u64,
    pub duration_secs: f64,
    pub checksum: String,
}

impl RecordingMetadata {
    pub fn new(
        file_path: &str,
        device_name: &str,
        format: DeviceFormat,
        frame_count: u64,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path: file_path.to_string(),
            device_name: device_name.to_string(),
            format,
            frame_count,
            duration_secs: duration_secs(frame_count, format.sample_rate),
            checksum: checksum.to_string(),
        }
    }
}

pub(crate) fn duration_secs(frame_count: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    frame_count as f64 / sample_rate as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_models::SampleFormat;
    use approx::assert_relative_eq;

    #[test]
    fn duration_follows_frame_count() {
        assert_relative_eq!(duration_secs(22050, 44100), 0.5);
        assert_relative_eq!(duration_secs(0, 48000), 0.0);
        assert_relative_eq!(duration_secs(10, 0), 0.0);
    }

    #[test]
    fn metadata_round_trips_through_json() {
        let format = DeviceFormat::new(48000, 1, SampleFormat::F32);
        let metadata = RecordingMetadata::new("/tmp/a.wav", "USB Mic", format, 96000, "abc");
        assert_relative_eq!(metadata.duration_secs, 2.0);

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"sample_format\":\"f32\""));
        let parsed: RecordingMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
    }
}
