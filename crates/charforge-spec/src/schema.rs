//! Sculpt parameter schema.
//!
//! The schema enumerates the known sculpt sliders with their label, range and
//! default. Hosts read it to build slider rows; the character state reads it
//! to seed values and to clamp updates.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Lowest value any sculpt parameter may hold.
pub const SCULPT_MIN: i32 = 0;
/// Highest value any sculpt parameter may hold.
pub const SCULPT_MAX: i32 = 100;

/// Declaration of one sculpt slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Minimum value (inclusive).
    #[serde(default)]
    pub min: i32,
    /// Maximum value (inclusive).
    #[serde(default = "default_max")]
    pub max: i32,
    /// Initial value.
    #[serde(default = "default_value")]
    pub default: i32,
}

fn default_max() -> i32 {
    SCULPT_MAX
}

fn default_value() -> i32 {
    50
}

impl ParamSpec {
    /// Creates a new parameter declaration.
    pub fn new(label: impl Into<String>, min: i32, max: i32, default: i32) -> Self {
        Self {
            label: label.into(),
            min,
            max,
            default,
        }
    }

    /// Clamps a value into this parameter's range.
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Ordered set of known sculpt parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSchema {
    params: Vec<(String, ParamSpec)>,
}

impl Default for ParamSchema {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ParamSchema {
    /// The schema compiled into the application.
    pub fn builtin() -> Self {
        let body = [
            ("height", "Height"),
            ("breast_size", "Breast size"),
            ("hip_width", "Hip width"),
            ("arm_length", "Arm length"),
            ("leg_length", "Leg length"),
            ("thigh_size", "Thigh size"),
            ("forearm_size", "Forearm size"),
        ];
        let mut params: Vec<(String, ParamSpec)> = body
            .iter()
            .map(|(key, label)| (key.to_string(), ParamSpec::new(*label, SCULPT_MIN, SCULPT_MAX, 50)))
            .collect();
        params.push(("symmetry".to_string(), ParamSpec::new("Symmetry", SCULPT_MIN, SCULPT_MAX, 1)));
        Self { params }
    }

    /// Builds a schema from explicit declarations, validating each range.
    pub fn from_specs(
        specs: impl IntoIterator<Item = (String, ParamSpec)>,
    ) -> SpecResult<Self> {
        let mut params = Vec::new();
        for (key, spec) in specs {
            let min = spec.min.max(SCULPT_MIN);
            let max = spec.max.min(SCULPT_MAX);
            if min > max {
                return Err(SpecError::InvalidRange {
                    key,
                    min: spec.min,
                    max: spec.max,
                });
            }
            let spec = ParamSpec {
                default: spec.default.clamp(min, max),
                min,
                max,
                label: spec.label,
            };
            params.push((key, spec));
        }
        Ok(Self { params })
    }

    /// Parses a `body_parameters.json` document (`{key: {label, min, max, default}}`).
    pub fn from_json(json: &str) -> SpecResult<Self> {
        let raw: BTreeMap<String, ParamSpec> = serde_json::from_str(json).map_err(SpecError::Json)?;
        Self::from_specs(raw)
    }

    /// Loads a schema file.
    pub fn load(path: &Path) -> SpecResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SpecError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let raw: BTreeMap<String, ParamSpec> =
            serde_json::from_str(&content).map_err(|e| SpecError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::from_specs(raw)
    }

    /// Loads a schema file, falling back to [`ParamSchema::builtin`] when the
    /// file is missing or invalid.
    pub fn load_or_builtin(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No parameter schema at {}, using built-in", path.display());
            return Self::builtin();
        }
        match Self::load(path) {
            Ok(schema) if !schema.is_empty() => schema,
            Ok(_) => {
                tracing::warn!("Parameter schema {} is empty, using built-in", path.display());
                Self::builtin()
            }
            Err(e) => {
                tracing::warn!("Ignoring parameter schema: {}", e);
                Self::builtin()
            }
        }
    }

    /// Looks up a parameter declaration.
    pub fn get(&self, key: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, spec)| spec)
    }

    /// Returns true if `key` is declared.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Declared keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(k, _)| k.as_str())
    }

    /// Declarations in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
        self.params.iter().map(|(k, spec)| (k.as_str(), spec))
    }

    /// Default value per key.
    pub fn defaults(&self) -> impl Iterator<Item = (String, i32)> + '_ {
        self.params.iter().map(|(k, spec)| (k.clone(), spec.default))
    }

    /// Clamps a value for `key`. Undeclared keys use the global 0..=100 range.
    pub fn clamp(&self, key: &str, value: i32) -> i32 {
        match self.get(key) {
            Some(spec) => spec.clamp(value),
            None => value.clamp(SCULPT_MIN, SCULPT_MAX),
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_schema() {
        let schema = ParamSchema::builtin();
        assert_eq!(schema.len(), 8);
        assert_eq!(schema.get("height").unwrap().default, 50);
        assert_eq!(schema.get("symmetry").unwrap().max, 100);
        assert_eq!(schema.get("symmetry").unwrap().default, 1);
        assert_eq!(schema.keys().next(), Some("height"));
    }

    #[test]
    fn test_clamp() {
        let schema = ParamSchema::builtin();
        assert_eq!(schema.clamp("height", 140), 100);
        assert_eq!(schema.clamp("height", -3), 0);
        assert_eq!(schema.clamp("symmetry", 70), 70);
        assert_eq!(schema.clamp("symmetry", 170), 100);
        assert_eq!(schema.clamp("tail_length", 250), 100);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "height": {"label": "Height", "min": 0, "max": 100, "default": 40},
            "neck_length": {"label": "Neck", "min": 10, "max": 90, "default": 5}
        }"#;
        let schema = ParamSchema::from_json(json).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get("height").unwrap().default, 40);
        // Default is pulled into range.
        assert_eq!(schema.get("neck_length").unwrap().default, 10);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let json = r#"{"height": {"label": "Height", "min": 80, "max": 20, "default": 50}}"#;
        let result = ParamSchema::from_json(json);
        assert!(matches!(result, Err(SpecError::InvalidRange { .. })));
    }

    #[test]
    fn test_load_or_builtin_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body_parameters.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(ParamSchema::load_or_builtin(&path), ParamSchema::builtin());

        let missing = dir.path().join("missing.json");
        assert_eq!(ParamSchema::load_or_builtin(&missing), ParamSchema::builtin());
    }

    #[test]
    fn test_load_or_builtin_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body_parameters.json");
        std::fs::write(
            &path,
            r#"{"height": {"label": "Height", "min": 0, "max": 100, "default": 65}}"#,
        )
        .unwrap();
        let schema = ParamSchema::load_or_builtin(&path);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get("height").unwrap().default, 65);
    }
}
