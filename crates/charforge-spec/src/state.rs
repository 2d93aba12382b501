//! In-memory character model.
//!
//! [`CharacterState`] owns the five keyed maps (sculpt, anatomy, assets,
//! physics, materials) plus the explicit-content flag. It knows nothing about
//! viewports or files; the core wraps it with notifications and persistence.

use crate::error::{SpecResult, ValidationWarning};
use crate::keyed_map::KeyedMap;
use crate::material::MaterialData;
use crate::preset::PresetData;
use crate::schema::{ParamSchema, SCULPT_MAX, SCULPT_MIN};

/// Anatomy layers and their initial visibility.
pub const ANATOMY_LAYERS: [(&str, bool); 8] = [
    ("skin", true),
    ("fat", true),
    ("muscle", false),
    ("bone", false),
    ("organs", false),
    ("breasts", true),
    ("genitals", true),
    ("bodyhair", false),
];

/// Asset layer categories.
pub const ASSET_CATEGORIES: [&str; 3] = ["clothes", "piercings", "tattoos"];

/// Physics flags; all start enabled.
pub const PHYSICS_FLAGS: [&str; 3] = ["breasts", "cloth", "piercings"];

/// Built-in material slots.
pub fn default_materials() -> Vec<(&'static str, MaterialData)> {
    vec![
        ("skin", MaterialData::new("#f5cba7", 0.5, 0.0)),
        ("clothes", MaterialData::new("#cccccc", 0.7, 0.0)),
        ("piercings", MaterialData::new("#aaaaaa", 0.1, 1.0)),
        ("tattoos", MaterialData::new("#000000", 0.9, 0.0)),
    ]
}

/// Mutable character model for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterState {
    schema: ParamSchema,
    sculpt: KeyedMap<i32>,
    nsfw: bool,
    anatomy: KeyedMap<bool>,
    assets: KeyedMap<Vec<String>>,
    physics: KeyedMap<bool>,
    materials: KeyedMap<MaterialData>,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self::new(ParamSchema::builtin())
    }
}

impl CharacterState {
    /// Creates a state seeded with defaults for every known key.
    pub fn new(schema: ParamSchema) -> Self {
        Self {
            sculpt: KeyedMap::seeded(schema.defaults()),
            schema,
            nsfw: true,
            anatomy: KeyedMap::seeded(ANATOMY_LAYERS),
            assets: KeyedMap::seeded(ASSET_CATEGORIES.iter().map(|c| (*c, Vec::new()))),
            physics: KeyedMap::seeded(PHYSICS_FLAGS.iter().map(|k| (*k, true))),
            materials: KeyedMap::seeded(default_materials()),
        }
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    pub fn sculpt(&self) -> &KeyedMap<i32> {
        &self.sculpt
    }

    /// Current value of one sculpt parameter.
    pub fn sculpt_value(&self, key: &str) -> Option<i32> {
        self.sculpt.get(key).copied()
    }

    /// Sets a sculpt parameter, clamped to its range. Returns the stored value.
    pub fn set_sculpt(&mut self, key: &str, value: i32) -> i32 {
        let clamped = self.schema.clamp(key, value);
        self.sculpt.set(key, clamped);
        clamped
    }

    pub fn nsfw(&self) -> bool {
        self.nsfw
    }

    pub fn set_nsfw(&mut self, enabled: bool) {
        self.nsfw = enabled;
    }

    pub fn anatomy(&self) -> &KeyedMap<bool> {
        &self.anatomy
    }

    /// Returns true if the layer exists and is enabled.
    pub fn anatomy_enabled(&self, layer: &str) -> bool {
        self.anatomy.get(layer).copied().unwrap_or(false)
    }

    /// Toggles an anatomy layer. Unknown layers are ignored (returns false).
    pub fn set_anatomy(&mut self, layer: &str, enabled: bool) -> bool {
        self.anatomy.set_known(layer, enabled)
    }

    pub fn assets(&self) -> &KeyedMap<Vec<String>> {
        &self.assets
    }

    /// Appends an asset reference to a category.
    ///
    /// Without an explicit path a `{category}_demo_asset` placeholder is
    /// added. Unknown categories are ignored (returns false).
    pub fn add_asset(&mut self, category: &str, path: Option<&str>) -> bool {
        if !self.assets.is_known(category) {
            return false;
        }
        let entry = path
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_demo_asset", category));
        if let Some(list) = self.assets.get_mut(category) {
            list.push(entry);
        }
        true
    }

    pub fn physics(&self) -> &KeyedMap<bool> {
        &self.physics
    }

    /// Sets a physics flag. Unknown flags are ignored (returns false).
    pub fn set_physics(&mut self, key: &str, enabled: bool) -> bool {
        self.physics.set_known(key, enabled)
    }

    pub fn materials(&self) -> &KeyedMap<MaterialData> {
        &self.materials
    }

    /// Replaces a material's color.
    ///
    /// Returns `Ok(false)` for an unknown slot and an error for a color that
    /// is not `#RRGGBB`.
    pub fn set_material_color(&mut self, key: &str, hex: &str) -> SpecResult<bool> {
        match self.materials.get_mut(key) {
            Some(material) => {
                material.set_color(hex)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replaces a whole material slot, normalizing its factors. Unknown slots
    /// are ignored (returns false).
    pub fn set_material(&mut self, key: &str, material: MaterialData) -> bool {
        let (material, _) = material.normalized();
        self.materials.set_known(key, material)
    }

    /// Deep copy of the current state.
    pub fn snapshot(&self) -> PresetData {
        PresetData {
            sculpt_data: self.sculpt.to_flat(),
            nsfw: Some(self.nsfw),
            anatomy: self.anatomy.to_flat(),
            assets: self.assets.to_flat(),
            physics: self.physics.to_flat(),
            materials: self.materials.to_flat(),
        }
    }

    /// Merges a preset into the state.
    ///
    /// Keys present in the preset overwrite current values; keys and whole
    /// categories it omits are left untouched. Out-of-range values are
    /// clamped and keys outside the vocabulary are kept in the extra bag;
    /// both produce warnings.
    pub fn apply_preset(&mut self, preset: &PresetData) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for (key, &value) in &preset.sculpt_data {
            let stored = self.set_sculpt(key, value);
            let field = format!("sculpt_data.{}", key);
            if stored != value {
                warnings.push(ValidationWarning::new(
                    &field,
                    format!("value {} clamped to {}", value, stored),
                ));
            }
            if !self.schema.contains(key) {
                warnings.push(ValidationWarning::new(
                    &field,
                    format!(
                        "unknown parameter kept (range {}..={})",
                        SCULPT_MIN, SCULPT_MAX
                    ),
                ));
            }
        }

        if let Some(nsfw) = preset.nsfw {
            self.nsfw = nsfw;
        }

        for (key, &value) in &preset.anatomy {
            if !self.anatomy.is_known(key) {
                warnings.push(ValidationWarning::new(
                    format!("anatomy.{}", key),
                    "unknown layer kept",
                ));
            }
            self.anatomy.set(key.as_str(), value);
        }

        for (category, list) in &preset.assets {
            if !self.assets.is_known(category) {
                warnings.push(ValidationWarning::new(
                    format!("assets.{}", category),
                    "unknown category kept",
                ));
            }
            self.assets.set(category.as_str(), list.clone());
        }

        for (key, &value) in &preset.physics {
            if !self.physics.is_known(key) {
                warnings.push(ValidationWarning::new(
                    format!("physics.{}", key),
                    "unknown flag kept",
                ));
            }
            self.physics.set(key.as_str(), value);
        }

        for (key, material) in &preset.materials {
            let (material, notes) = material.normalized();
            let field = format!("materials.{}", key);
            for note in notes {
                warnings.push(ValidationWarning::new(&field, note));
            }
            if !self.materials.is_known(key) {
                warnings.push(ValidationWarning::new(&field, "unknown material kept"));
            }
            self.materials.set(key.as_str(), material);
        }

        warnings
    }
}
