//! Runtime settings
//!
//! Loaded from an optional JSON file on native builds. Gameplay rules are
//! constants in [`crate::consts`]; only the run setup is configurable.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::content::ContentConfig;

/// Viewport size in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl ViewportSettings {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Demo player tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplaySettings {
    pub enabled: bool,
    /// Chance (0.0 - 1.0) that a tap lands on its balloon
    pub accuracy: f32,
    /// Delay between a balloon appearing on screen and the tap
    pub reaction_ms: u64,
}

impl Default for AutoplaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            accuracy: 0.85,
            reaction_ms: 350,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed of the first session; each restart uses the next one
    pub seed: u64,
    pub viewport: ViewportSettings,
    /// Where balloon textures come from
    pub content: ContentConfig,
    pub autoplay: AutoplaySettings,

    // === Run cap (headless runs) ===
    /// Stop after this many finished sessions
    pub max_sessions: u32,
    /// Stop after this much simulated time regardless
    pub max_sim_secs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x0B41_100D,
            viewport: ViewportSettings::default(),
            content: ContentConfig::default(),
            autoplay: AutoplaySettings::default(),
            max_sessions: 3,
            max_sim_secs: 600,
        }
    }
}

/// Why settings could not be loaded
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read settings: {err}"),
            Self::Parse(err) => write!(f, "invalid settings JSON: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// No filesystem on the web: always the defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load(_path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        log::info!("Using default settings");
        Ok(Self::default())
    }
}
