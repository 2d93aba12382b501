//! Rig-readiness validation.
//!
//! Validation is advisory. It decides whether slider-driven deformation is
//! worth attempting and which warning to surface; it never blocks display.

use std::path::Path;

use serde::Serialize;

use crate::loader::Scene;

/// Message when the file cannot be parsed.
pub const MSG_LOAD_FAILED: &str = "Could not load model.";
/// Message when the document has no meshes.
pub const MSG_NO_MESHES: &str = "No meshes found. Model may be empty.";
/// Message when the model has no armature.
pub const MSG_NO_RIG: &str = "Model has no armature/skin. Slider deformations may not work. Consider using a rigged base model.";

/// Rig-readiness of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// At least one mesh exists.
    pub is_valid: bool,
    /// A skin exists, or the hierarchy has more than one node.
    pub has_rig: bool,
    pub has_skin: bool,
    pub mesh_count: usize,
    pub node_count: usize,
    /// Diagnostic for the user; `None` when valid and rigged.
    pub message: Option<String>,
}

impl ValidationResult {
    /// Classifies raw document counts.
    pub fn from_counts(mesh_count: usize, node_count: usize, skin_count: usize) -> Self {
        let is_valid = mesh_count > 0;
        let has_skin = skin_count > 0;
        let has_rig = has_skin || node_count > 1;
        let message = if !is_valid {
            Some(MSG_NO_MESHES.to_string())
        } else if !has_rig {
            Some(MSG_NO_RIG.to_string())
        } else {
            None
        };
        Self {
            is_valid,
            has_rig,
            has_skin,
            mesh_count,
            node_count,
            message,
        }
    }

    /// Result for a file that could not be parsed.
    pub fn load_failed() -> Self {
        Self {
            is_valid: false,
            has_rig: false,
            has_skin: false,
            mesh_count: 0,
            node_count: 0,
            message: Some(MSG_LOAD_FAILED.to_string()),
        }
    }

    fn from_document(document: &gltf::Document) -> Self {
        Self::from_counts(
            document.meshes().count(),
            document.nodes().count(),
            document.skins().count(),
        )
    }

    fn log(&self) {
        tracing::info!(
            "Validation: meshes={}, nodes={}, hasSkin={}",
            self.mesh_count,
            self.node_count,
            self.has_skin
        );
    }
}

/// Validates a model file by parsing only its document.
pub fn validate_model(path: &Path) -> ValidationResult {
    let result = match gltf::Gltf::open(path) {
        Ok(gltf) => ValidationResult::from_document(&gltf.document),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Model validation could not parse file");
            ValidationResult::load_failed()
        }
    };
    result.log();
    result
}

/// Validates GLB bytes held in memory.
pub fn validate_slice(bytes: &[u8]) -> ValidationResult {
    let result = match gltf::Gltf::from_slice(bytes) {
        Ok(gltf) => ValidationResult::from_document(&gltf.document),
        Err(e) => {
            tracing::error!(error = %e, "Model validation could not parse data");
            ValidationResult::load_failed()
        }
    };
    result.log();
    result
}

/// Validates an already loaded scene.
pub fn validate_scene(scene: &Scene) -> ValidationResult {
    ValidationResult::from_counts(scene.meshes.len(), scene.node_count, scene.skin_count)
}
