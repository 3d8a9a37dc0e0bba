use std::fs;
use std::path::{Path, PathBuf};

use rdev::Key;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConfigError;
use crate::{APP_NAME, CONFIG_FILE_NAME, DEFAULT_KEY_DELAY_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global key that starts and stops typing.
    #[serde(default = "default_hotkey")]
    pub hotkey: Key,
    /// Pause between individual synthesized key events.
    #[serde(default = "default_key_delay")]
    pub key_delay_ms: u64,
    /// Playlist loaded at start-up.
    #[serde(default)]
    pub autoload: Option<PathBuf>,
}

fn default_hotkey() -> Key {
    Key::F12
}

fn default_key_delay() -> u64 {
    DEFAULT_KEY_DELAY_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hotkey: default_hotkey(),
            key_delay_ms: default_key_delay(),
            autoload: None,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(APP_NAME);
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Loads the config, writing the defaults first if there is no file yet.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path()?;
    if !path.exists() {
        create_default_config(&path)?;
        return Ok(AppConfig::default());
    }
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ConfigError::CreateConfigDir { source })?;
    }
    let json = serde_json::to_string_pretty(&AppConfig::default()).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, json).map_err(|source| ConfigError::WriteDefaultConfig { source })?;
    info!("Wrote default configuration to {}", path.display());
    Ok(())
}
