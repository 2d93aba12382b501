//! Preview selection: the active 3D model, or a 2D anatomy illustration.

use std::path::PathBuf;

use charforge_spec::KeyedMap;
use serde::Serialize;

use crate::paths::AppPaths;
use crate::transform::SculptTransform;

/// Highest-priority active layer wins.
pub const PREVIEW_PRIORITY: [(&str, &str); 4] = [
    ("organs", "skin_fat_muscle_bone_organs"),
    ("bone", "skin_fat_muscle_bone"),
    ("muscle", "skin_fat_muscle"),
    ("fat", "skin_fat"),
];

pub const DEFAULT_PREVIEW_IMAGE: &str = "skin";

/// What the viewport should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewPlan {
    /// A parsed 3D model. `transform` is `None` when deformation is gated off.
    Model {
        path: PathBuf,
        transform: Option<SculptTransform>,
    },
    /// Fallback illustration for the current anatomy layers.
    Image { path: PathBuf },
    /// Nothing to show.
    Placeholder { reason: String },
}

/// Illustration name for the current anatomy flags.
pub fn preview_image_name(anatomy: &KeyedMap<bool>) -> &'static str {
    PREVIEW_PRIORITY
        .iter()
        .find(|(layer, _)| anatomy.get(layer).copied().unwrap_or(false))
        .map(|(_, image)| *image)
        .unwrap_or(DEFAULT_PREVIEW_IMAGE)
}

/// Image plan, degrading to a placeholder when the file is missing.
pub fn image_plan(paths: &AppPaths, anatomy: &KeyedMap<bool>) -> PreviewPlan {
    let name = preview_image_name(anatomy);
    let path = paths.preview_image(name);
    if path.is_file() {
        PreviewPlan::Image { path }
    } else {
        tracing::debug!("Preview image {} missing", path.display());
        PreviewPlan::Placeholder {
            reason: format!("Preview image '{}' not found", name),
        }
    }
}
