// Settings store - JSON persistence of user preferences
//
// Opaque key/value contract between sessions: volume, mute and the key
// layout name live in one JSON document under the user config directory.
// The performance engine never touches this; main hydrates the engine at
// startup and the UI writes changes back. A missing or unreadable file is
// not an error, it just means defaults.

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

const SETTINGS_DIR: &str = "virtual_piano";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub volume: f32,
    pub muted: bool,
    pub layout: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 0.5,
            muted: false,
            layout: "qwerty".to_string(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store under the platform config directory.
    pub fn new() -> Result<Self, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self {
            path: dir.join(SETTINGS_DIR).join(SETTINGS_FILE),
        })
    }

    /// Store at an explicit path; used by tests.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the settings document, falling back to defaults when the file
    /// is missing or does not parse. Load never fails.
    pub fn load(&self) -> Settings {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!("no settings at {}: {err}", self.path.display());
                return Settings::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("unreadable settings at {}: {err}", self.path.display());
                Settings::default()
            }
        }
    }

    /// Write the settings document, creating the directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::with_path(dir.path().join("settings.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_defaults_when_file_is_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json at all {{{").unwrap();

        let store = SettingsStore::with_path(path);
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        // Nested path checks the create_dir_all branch
        let store = SettingsStore::with_path(dir.path().join("nested").join("settings.json"));

        let settings = Settings {
            volume: 0.8,
            muted: true,
            layout: "qwerty".to_string(),
        };
        store.save(&settings).unwrap();

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "volume": 0.9 }"#).unwrap();

        let store = SettingsStore::with_path(path);
        let settings = store.load();
        assert_eq!(settings.volume, 0.9);
        assert!(!settings.muted);
        assert_eq!(settings.layout, "qwerty");
    }
}
