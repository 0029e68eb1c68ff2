//! Application settings persistence for StackMate.
//!
//! Stores user preferences (language, theme, companion service address and
//! notes file location) in a JSON file at an OS-appropriate location.

use serde::{Deserialize, Serialize};
use stackmate_core::services::DEFAULT_SERVICE_URL;
use std::fs;
use std::path::{Path, PathBuf};

/// Light or dark chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Interface language code, e.g. `"english"`.
    pub language: String,
    pub dark_mode: bool,
    /// Base URL of the companion service.
    pub service_url: String,
    /// SQLite file holding saved notes.
    pub store_path: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: "english".to_string(),
            dark_mode: false,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            store_path: default_store_path().to_string_lossy().to_string(),
        }
    }
}

impl AppSettings {
    pub fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme().toggled();
        self.dark_mode = theme == Theme::Dark;
        theme
    }

    /// Updates one setting by its JSON key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "language" => {
                if !crate::locales::is_supported(value) {
                    return Err(format!("Unsupported language: {value}"));
                }
                self.language = value.to_string();
            }
            "darkMode" => {
                self.dark_mode = value
                    .parse()
                    .map_err(|_| format!("darkMode must be true or false, got {value}"))?;
            }
            "serviceUrl" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(format!("serviceUrl must be an http(s) URL: {value}"));
                }
                self.service_url = value.trim_end_matches('/').to_string();
            }
            "storePath" => {
                if value.trim().is_empty() {
                    return Err("storePath cannot be empty".to_string());
                }
                self.store_path = value.to_string();
            }
            _ => return Err(format!("Unknown setting: {key}")),
        }
        Ok(())
    }
}

/// Returns the directory holding StackMate's settings.
///
/// - macOS / Linux: `~/.config/stackmate`
/// - Windows: `%APPDATA%/StackMate`
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("StackMate")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("stackmate")
    }
}

/// Returns the path to the settings JSON file.
pub fn settings_file_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Returns the default notes file: `<data dir>/stackmate/notes.db`.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join("stackmate")
        .join("notes.db")
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings_from(path: &Path) -> AppSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings file {}: {e}", path.display());
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create settings directory: {e}"))?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write settings: {e}"))?;
    Ok(())
}

/// Loads the file at `path`, applies `change` and saves the result.
/// Nothing is written when `change` fails.
pub fn update_settings_file<F>(path: &Path, change: F) -> Result<AppSettings, String>
where
    F: FnOnce(&mut AppSettings) -> Result<(), String>,
{
    let mut settings = load_settings_from(path);
    change(&mut settings)?;
    save_settings_to(path, &settings)?;
    log::info!("Saved settings to {}", path.display());
    Ok(settings)
}
