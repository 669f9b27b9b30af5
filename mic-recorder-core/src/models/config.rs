use std::path::PathBuf;
use std::time::Duration;

use crate::storage::paths;

/// Configuration for a recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Directory where recordings are written. Created on demand.
    pub output_directory: PathBuf,

    /// Write a `<recording>.metadata.json` sidecar next to each recording.
    pub write_metadata: bool,

    /// How long `stop()` waits for the capture stream to release its
    /// producer after teardown before giving up on the recording.
    pub drain_timeout: Duration,
}

impl RecorderConfig {
    pub fn with_output_directory(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.output_directory.as_os_str().is_empty() {
            return Err("output directory must not be empty".into());
        }
        if self.output_directory.is_file() {
            return Err(format!(
                "output directory is a file: {}",
                self.output_directory.display()
            ));
        }
        if self.drain_timeout.is_zero() {
            return Err("drain timeout must be positive".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_directory: paths::default_output_dir(),
            write_metadata: false,
            drain_timeout: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(RecorderConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_directory() {
        let config = RecorderConfig::with_output_directory("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_file_as_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = RecorderConfig::with_output_directory(file.path());
        assert!(config.validate().unwrap_err().contains("is a file"));
    }

    #[test]
    fn rejects_zero_drain_timeout() {
        let config = RecorderConfig {
            drain_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
