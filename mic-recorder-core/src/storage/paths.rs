//! Output locations for recordings.
//!
//! Recordings land in `<local data dir>/mic-recorder/recordings/` unless the
//! host configures another directory. File names are
//! `<YYYYmmddHHMMSS>_<uuid>.wav`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use uuid::Uuid;

const APP_DIR: &str = "mic-recorder";

/// Default recordings directory, falling back to the system temp dir when
/// the platform has no local data dir.
pub fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join("recordings")
}

/// Generate a fresh recording path inside `dir`, creating `dir` if needed.
pub fn generate_recording_path(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    loop {
        let path = dir.join(format!("{}_{}.wav", timestamp, Uuid::new_v4()));
        if !path.exists() {
            return Ok(path);
        }
    }
}

/// Hidden sibling used while a recording is being written.
pub fn partial_path(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".into());
    final_path.with_file_name(format!(".{}.part", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_paths_are_unique_wav_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths: HashSet<PathBuf> = (0..50)
            .map(|_| generate_recording_path(dir.path()).unwrap())
            .collect();

        assert_eq!(paths.len(), 50);
        for path in &paths {
            assert_eq!(path.parent(), Some(dir.path()));
            assert!(path.extension().map(|e| e == "wav").unwrap_or(false));
        }
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = generate_recording_path(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn partial_path_is_hidden_sibling() {
        let path = Path::new("/data/rec/20240101120000_x.wav");
        assert_eq!(
            partial_path(path),
            PathBuf::from("/data/rec/.20240101120000_x.wav.part")
        );
    }

    #[test]
    fn default_dir_is_app_scoped() {
        let dir = default_output_dir();
        let text = dir.to_string_lossy();
        assert!(text.contains(APP_DIR));
        assert!(text.ends_with("recordings"));
    }
}
