//! Error types for scene loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur while loading a GLB scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The file could not be opened or is not a valid glTF container.
    #[error("Failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    /// In-memory bytes are not a valid glTF container.
    #[error("Invalid glTF data: {0}")]
    Gltf(#[from] gltf::Error),

    /// A buffer referenced by the document could not be resolved.
    #[error("Failed to resolve buffers: {0}")]
    Buffers(#[source] gltf::Error),

    /// Parsing succeeded but nothing renderable was found.
    #[error("Scene has no drawable geometry ({meshes} meshes)")]
    NoDrawables { meshes: usize },
}
