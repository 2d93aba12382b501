//! Named character snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::material::MaterialData;

/// A persisted snapshot of the full character state.
///
/// Every category defaults to empty when absent from the file. Applying a
/// preset merges per category, so an empty category leaves the in-memory
/// values alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresetData {
    /// Sculpt slider values.
    #[serde(default)]
    pub sculpt_data: BTreeMap<String, i32>,
    /// Explicit-content toggle. Absent in presets written before the flag existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    /// Anatomy layer visibility.
    #[serde(default)]
    pub anatomy: BTreeMap<String, bool>,
    /// Asset references per category.
    #[serde(default)]
    pub assets: BTreeMap<String, Vec<String>>,
    /// Physics simulation flags.
    #[serde(default)]
    pub physics: BTreeMap<String, bool>,
    /// Material slots.
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialData>,
}

impl PresetData {
    /// Parses a preset from JSON.
    pub fn from_json(json: &str) -> SpecResult<Self> {
        serde_json::from_str(json).map_err(SpecError::Json)
    }

    /// Serializes the preset to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> SpecResult<String> {
        serde_json::to_string_pretty(self).map_err(SpecError::Serialize)
    }

    /// Returns true if the preset was saved with explicit content enabled.
    pub fn is_nsfw(&self) -> bool {
        self.nsfw.unwrap_or(false)
    }
}
