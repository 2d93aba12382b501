//! Live viewport transform derived from sculpt parameters.
//!
//! Height drives a uniform scale about the model's bounds center. The
//! opt-in [`TransformPolicy::ScaleAndOffset`] adds small per-axis offsets
//! for height, hip width and breast size.

use std::fmt;
use std::str::FromStr;

use charforge_spec::KeyedMap;
use glam::{Mat4, Vec3};
use serde::Serialize;

/// Scale at height 0.
pub const BASE_SCALE: f32 = 0.6;
/// Scale added between height 0 and height 100.
pub const SCALE_RANGE: f32 = 0.8;
/// Offset per slider step away from 50.
pub const OFFSET_STEP: f32 = 0.02;
/// Neutral slider value.
pub const NEUTRAL_VALUE: i32 = 50;

/// (parameter, axis, weight) for the offset policy.
pub const OFFSET_WEIGHTS: [(&str, Vec3, f32); 3] = [
    ("height", Vec3::Y, 1.0),
    ("hip_width", Vec3::X, 0.5),
    ("breast_size", Vec3::Z, 0.3),
];

/// How sculpt parameters map onto the viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformPolicy {
    /// Uniform scale from height only.
    #[default]
    ScaleOnly,
    /// Height scale plus additive per-axis offsets.
    ScaleAndOffset,
}

impl TransformPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformPolicy::ScaleOnly => "scale_only",
            TransformPolicy::ScaleAndOffset => "scale_and_offset",
        }
    }

    /// Computes the transform for `params` around `pivot`.
    pub fn compute(&self, params: &KeyedMap<i32>, pivot: Vec3) -> SculptTransform {
        let value = |key: &str| params.get(key).copied().unwrap_or(NEUTRAL_VALUE);
        let offset = match self {
            TransformPolicy::ScaleOnly => Vec3::ZERO,
            TransformPolicy::ScaleAndOffset => OFFSET_WEIGHTS
                .iter()
                .map(|(key, axis, weight)| *axis * axis_offset(value(key), *weight))
                .sum(),
        };
        SculptTransform {
            scale: height_scale(value("height")),
            pivot,
            offset,
        }
    }
}

impl fmt::Display for TransformPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scale_only" => Ok(TransformPolicy::ScaleOnly),
            "scale_and_offset" => Ok(TransformPolicy::ScaleAndOffset),
            other => Err(format!("unknown transform policy '{}'", other)),
        }
    }
}

/// `0.6 + (height / 100) * 0.8`
pub fn height_scale(height: i32) -> f32 {
    BASE_SCALE + (height as f32 / 100.0) * SCALE_RANGE
}

/// `(value - 50) * 0.02 * weight`
pub fn axis_offset(value: i32, weight: f32) -> f32 {
    (value - NEUTRAL_VALUE) as f32 * OFFSET_STEP * weight
}

/// Transform handed to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SculptTransform {
    pub scale: f32,
    pub pivot: Vec3,
    pub offset: Vec3,
}

impl SculptTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            pivot: Vec3::ZERO,
            offset: Vec3::ZERO,
        }
    }

    /// `T(offset) * T(pivot) * S * T(-pivot)`
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset)
            * Mat4::from_translation(self.pivot)
            * Mat4::from_scale(Vec3::splat(self.scale))
            * Mat4::from_translation(-self.pivot)
    }
}

impl Default for SculptTransform {
    fn default() -> Self {
        Self::identity()
    }
}
