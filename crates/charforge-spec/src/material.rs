//! Material records attached to character layers.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SpecError, SpecResult};

/// Regex pattern for a `#RRGGBB` color.
const HEX_COLOR_PATTERN: &str = r"^#[0-9A-Fa-f]{6}$";

static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();

fn hex_color_regex() -> &'static Regex {
    HEX_COLOR_REGEX.get_or_init(|| Regex::new(HEX_COLOR_PATTERN).expect("invalid regex pattern"))
}

/// Returns true if `value` is a `#RRGGBB` hex color.
pub fn is_hex_color(value: &str) -> bool {
    hex_color_regex().is_match(value)
}

fn default_color() -> String {
    "#cccccc".to_string()
}

/// Surface description for one material slot.
///
/// Serialized as `{color, roughness, metallic, texture}`. An absent texture
/// is written as an empty string and both `""` and `null` read back as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    /// Base color as `#RRGGBB`.
    #[serde(default = "default_color")]
    pub color: String,
    /// Roughness in `0.0..=1.0`.
    #[serde(default)]
    pub roughness: f64,
    /// Metallic factor in `0.0..=1.0`.
    #[serde(default)]
    pub metallic: f64,
    /// Optional texture path.
    #[serde(
        default,
        serialize_with = "serialize_texture",
        deserialize_with = "deserialize_texture"
    )]
    pub texture: Option<String>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            color: default_color(),
            roughness: 0.0,
            metallic: 0.0,
            texture: None,
        }
    }
}

impl MaterialData {
    /// Creates an untextured material. Factors are clamped into `0.0..=1.0`.
    pub fn new(color: impl Into<String>, roughness: f64, metallic: f64) -> Self {
        Self {
            color: color.into(),
            roughness: roughness.clamp(0.0, 1.0),
            metallic: metallic.clamp(0.0, 1.0),
            texture: None,
        }
    }

    /// Sets the texture path.
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    /// Replaces the color after validating it.
    pub fn set_color(&mut self, hex: &str) -> SpecResult<()> {
        if !is_hex_color(hex) {
            return Err(SpecError::InvalidColor {
                value: hex.to_string(),
            });
        }
        self.color = hex.to_string();
        Ok(())
    }

    /// Returns a copy with factors clamped into range, plus a note for every
    /// field that had to change.
    pub fn normalized(&self) -> (Self, Vec<String>) {
        let mut notes = Vec::new();
        let mut out = self.clone();

        if !is_hex_color(&out.color) {
            notes.push(format!(
                "color '{}' is not #RRGGBB, using {}",
                out.color,
                default_color()
            ));
            out.color = default_color();
        }
        let roughness = clamp_unit(out.roughness);
        if roughness != out.roughness {
            notes.push(format!("roughness {} clamped to {}", out.roughness, roughness));
            out.roughness = roughness;
        }
        let metallic = clamp_unit(out.metallic);
        if metallic != out.metallic {
            notes.push(format!("metallic {} clamped to {}", out.metallic, metallic));
            out.metallic = metallic;
        }

        (out, notes)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn serialize_texture<S>(texture: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(texture.as_deref().unwrap_or(""))
}

fn deserialize_texture<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#f5cba7"));
        assert!(is_hex_color("#AABBCC"));
        assert!(!is_hex_color("f5cba7"));
        assert!(!is_hex_color("#fff"));
        assert!(!is_hex_color("#gggggg"));
    }

    #[test]
    fn test_set_color_rejects_invalid() {
        let mut mat = MaterialData::new("#000000", 0.5, 0.0);
        assert!(mat.set_color("blue").is_err());
        assert_eq!(mat.color, "#000000");
        mat.set_color("#123abc").unwrap();
        assert_eq!(mat.color, "#123abc");
    }

    #[test]
    fn test_texture_serializes_as_empty_string() {
        let mat = MaterialData::new("#cccccc", 0.7, 0.0);
        let json = serde_json::to_value(&mat).unwrap();
        assert_eq!(json["texture"], "");
        assert_eq!(json["color"], "#cccccc");
    }

    #[test]
    fn test_texture_reads_empty_and_null_as_absent() {
        let a: MaterialData =
            serde_json::from_str(r##"{"color":"#000000","roughness":0.9,"metallic":0,"texture":""}"##)
                .unwrap();
        let b: MaterialData =
            serde_json::from_str(r##"{"color":"#000000","roughness":0.9,"metallic":0,"texture":null}"##)
                .unwrap();
        let c: MaterialData = serde_json::from_str(r##"{"color":"#000000"}"##).unwrap();
        assert_eq!(a.texture, None);
        assert_eq!(b.texture, None);
        assert_eq!(c.texture, None);
        assert_eq!(c.roughness, 0.0);
    }

    #[test]
    fn test_texture_survives_json() {
        let mat = MaterialData::new("#aaaaaa", 0.1, 1.0).with_texture("textures/steel.png");
        let json = serde_json::to_string(&mat).unwrap();
        let back: MaterialData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mat);
    }

    #[test]
    fn test_normalized_clamps() {
        let mat = MaterialData {
            color: "nope".to_string(),
            roughness: 1.5,
            metallic: -0.2,
            texture: None,
        };
        let (fixed, notes) = mat.normalized();
        assert_eq!(fixed.color, "#cccccc");
        assert_eq!(fixed.roughness, 1.0);
        assert_eq!(fixed.metallic, 0.0);
        assert_eq!(notes.len(), 3);
    }
}
