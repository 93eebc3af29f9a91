//! Configuration loading and saving.
//!
//! Config lives at ~/.config/keybee/config.json; the cache snapshot lives
//! next to it. An unreadable or invalid config falls back to defaults
//! rather than failing startup.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::{KeybeeError, Result};

use super::types::Config;

/// Directory holding config.json and cache.json (~/.config/keybee).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".config").join("keybee"))
        .unwrap_or_else(|| std::env::temp_dir().join("keybee"))
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

pub fn cache_path() -> PathBuf {
    config_dir().join("cache.json")
}

/// First run means no config file has ever been written; the caller is
/// expected to run discovery and save an initial config.
pub fn is_first_run() -> bool {
    !config_path().exists()
}

/// Load configuration, falling back to defaults if the file is missing or
/// cannot be parsed.
pub fn load_config() -> Config {
    let path = config_path();
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    match fs::read_to_string(&path) {
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Failed to read config, using defaults");
            Config::default()
        }
        Ok(content) => match serde_json::from_str::<Config>(&content) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    sources = config.sources.len(),
                    "Loaded config"
                );
                config
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to parse config, using defaults");
                Config::default()
            }
        },
    }
}

/// Persist the configuration as pretty JSON, creating the config directory
/// if needed.
pub fn save_config(config: &Config) -> Result<()> {
    let dir = config_dir();
    let path = config_path();
    fs::create_dir_all(&dir).map_err(|e| KeybeeError::ConfigSave {
        path: path.display().to_string(),
        source: e,
    })?;

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| KeybeeError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(&path, json).map_err(|e| KeybeeError::ConfigSave {
        path: path.display().to_string(),
        source: e,
    })?;
    info!(path = %path.display(), "Saved config");
    Ok(())
}
