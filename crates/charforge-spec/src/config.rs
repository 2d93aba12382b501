//! Persisted application settings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Which base body the viewport and hand-off start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// `assets/characters/male_base.glb`
    #[default]
    Male,
    /// `assets/characters/female_base.glb`
    Female,
}

impl Gender {
    /// Returns the string identifier used in file names and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// All known genders, in display order.
    pub fn all() -> [Gender; 2] {
        [Gender::Male, Gender::Female]
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(SpecError::UnknownGender(other.to_string())),
        }
    }
}

/// UI theme. Stored as a free string so unknown values from newer builds
/// do not invalidate the whole config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Parses a theme name, falling back to [`Theme::Dark`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Persisted settings record (`config.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme name (`dark` / `light`).
    pub theme: String,
    /// Whether explicit anatomy layers are offered.
    pub nsfw_enabled: bool,
    /// Whether gamepad input is enabled.
    pub controller_enabled: bool,
    /// Whether the debug console is shown.
    pub debug_enabled: bool,
    /// Explicit path to the external modeling tool. Empty means auto-detect.
    pub blender_path: String,
    /// Active base body.
    pub gender: Gender,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Dark.as_str().to_string(),
            nsfw_enabled: true,
            controller_enabled: true,
            debug_enabled: true,
            blender_path: String::new(),
            gender: Gender::Male,
        }
    }
}

impl Config {
    /// Parsed theme.
    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.theme)
    }

    /// Configured tool path, if one is set.
    pub fn tool_path(&self) -> Option<&str> {
        let trimmed = self.blender_path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the config to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
