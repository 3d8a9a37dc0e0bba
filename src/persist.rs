//! Playlist files: the message list and settings as one flat JSON record.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::PersistError;
use crate::mode::Mode;
use crate::{DEFAULT_DELAY_SECS, LOADED_REPEAT_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default = "default_delay")]
    pub delay: u64,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u64,
}

fn default_delay() -> u64 {
    DEFAULT_DELAY_SECS
}

fn default_repeat_count() -> u64 {
    LOADED_REPEAT_COUNT
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            delay: default_delay(),
            mode: Mode::default(),
            repeat_count: default_repeat_count(),
        }
    }
}

pub fn save(path: &Path, snapshot: &PersistedSnapshot) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Saved {} messages to {}",
        snapshot.messages.len(),
        path.display()
    );
    Ok(())
}

pub fn load(path: &Path) -> Result<PersistedSnapshot, PersistError> {
    let raw = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: PersistedSnapshot =
        serde_json::from_str(&raw).map_err(|source| PersistError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        "Loaded {} messages from {}",
        snapshot.messages.len(),
        path.display()
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load_is_lossless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spam.json");
        let snapshot = PersistedSnapshot {
            messages: vec![
                "selling lobsters 50ea".to_string(),
                "  leading and trailing  ".to_string(),
                "ünïcödé ✓".to_string(),
            ],
            delay: 12,
            mode: Mode::TeamChat,
            repeat_count: 0,
        };

        save(&path, &snapshot).unwrap();
        assert_eq!(load(&path).unwrap(), snapshot);
    }

    #[test]
    fn test_missing_keys_fall_back_to_load_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"messages": ["hi"]}"#).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.messages, vec!["hi"]);
        assert_eq!(loaded.delay, 5);
        assert_eq!(loaded.mode, Mode::Plain);
        assert_eq!(loaded.repeat_count, 1);

        fs::write(&path, "{}").unwrap();
        assert_eq!(load(&path).unwrap(), PersistedSnapshot::default());
    }

    #[test]
    fn test_file_written_in_flat_record_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shape.json");
        let snapshot = PersistedSnapshot {
            messages: vec!["a".to_string()],
            delay: 3,
            mode: Mode::Yell,
            repeat_count: 2,
        };
        save(&path, &snapshot).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["messages"][0], "a");
        assert_eq!(value["delay"], 3);
        assert_eq!(value["mode"], "yell");
        assert_eq!(value["repeat_count"], 2);
    }

    #[test]
    fn test_malformed_files_are_decode_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path), Err(PersistError::Decode { .. })));

        fs::write(&path, r#"{"mode": "whisper"}"#).unwrap();
        assert!(matches!(load(&path), Err(PersistError::Decode { .. })));

        fs::write(&path, r#"{"delay": -1}"#).unwrap();
        assert!(matches!(load(&path), Err(PersistError::Decode { .. })));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let result = load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(PersistError::Read { .. })));
    }

    #[test]
    fn test_save_to_missing_directory_is_write_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("dir.json");
        let result = save(&path, &PersistedSnapshot::default());
        assert!(matches!(result, Err(PersistError::Write { .. })));
    }
}
