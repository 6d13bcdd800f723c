use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use pathcam_core::pipeline::monitor_session::Mode;
use pathcam_core::shared::constants::DEFAULT_TICK_INTERVAL_MS;

/// Persisted form of the session [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    View,
    Path,
}

impl DisplayMode {
    pub const ALL: &[DisplayMode] = &[DisplayMode::View, DisplayMode::Path];
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::View => write!(f, "Live view"),
            DisplayMode::Path => write!(f, "Path detection"),
        }
    }
}

impl From<DisplayMode> for Mode {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::View => Mode::View,
            DisplayMode::Path => Mode::Path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

pub const MIN_INTERVAL_MS: u64 = 10;
pub const MAX_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last address the user started, restored into the input field.
    pub address: String,
    pub mode: DisplayMode,
    pub interval_ms: u64,
    pub appearance: Appearance,
    pub high_contrast: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: String::new(),
            mode: DisplayMode::Path,
            interval_ms: DEFAULT_TICK_INTERVAL_MS,
            appearance: Appearance::System,
            high_contrast: false,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pathcam").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or unreadable files yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str::<Settings>(&json).ok())
            .map(Settings::sanitized)
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.interval_ms = self.interval_ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
        self
    }
}
