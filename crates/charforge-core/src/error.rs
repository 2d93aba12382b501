//! Error types for the character core.

use std::path::PathBuf;

use charforge_backend_blender::BlenderError;
use charforge_spec::SpecError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the character core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data model error (parse, validation).
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// External tool failure.
    #[error(transparent)]
    Blender(#[from] BlenderError),

    /// Filesystem error with the path involved.
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Preset names become file names and must be plain.
    #[error("Invalid preset name '{name}'")]
    InvalidPresetName { name: String },

    /// No preset file with that name.
    #[error("Preset '{name}' not found")]
    PresetNotFound { name: String },
}

impl CoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
