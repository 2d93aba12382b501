//! Error and warning types for the character data model.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data model operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while reading or validating character data.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Failed to read a file from disk.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file to disk.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents are not valid JSON for the expected shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Inline JSON is not valid for the expected shape.
    #[error("Invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// Failed to serialize a record to JSON.
    #[error("Failed to serialize: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A material color is not a `#RRGGBB` string.
    #[error("Invalid color '{value}': expected #RRGGBB")]
    InvalidColor { value: String },

    /// A parameter declares `min > max`.
    #[error("Invalid range for parameter '{key}': min {min} > max {max}")]
    InvalidRange { key: String, min: i32, max: i32 },

    /// Gender string is not one of the known base models.
    #[error("Unknown gender '{0}'. Expected 'male' or 'female'")]
    UnknownGender(String),
}

/// A non-fatal issue found while applying loaded data.
///
/// Warnings never abort a load; they describe values that were clamped or
/// moved into the unknown-key bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Dotted path of the offending field (e.g. `sculpt_data.height`).
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new warning.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
