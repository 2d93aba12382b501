//! Parameter hand-off to the sculpt script.
//!
//! The hand-off is a flat JSON object of sculpt values plus an optional
//! `_character_path`. It is written in full on every update and never read
//! back by this crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BlenderError, BlenderResult};

/// Snapshot of the parameters the sculpt script consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandoffPayload {
    #[serde(flatten)]
    pub params: BTreeMap<String, i32>,
    /// Absolute path of the active base model.
    #[serde(
        rename = "_character_path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub character_path: Option<String>,
}

impl HandoffPayload {
    pub fn new(params: BTreeMap<String, i32>, character_path: Option<&Path>) -> Self {
        Self {
            params,
            character_path: character_path.map(|p| absolute(p).to_string_lossy().into_owned()),
        }
    }

    pub fn to_json_pretty(&self) -> BlenderResult<String> {
        serde_json::to_string_pretty(self).map_err(BlenderError::HandoffSerialize)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Destination of hand-off writes.
pub trait HandoffSink: Send + Sync {
    fn write(&self, payload: &HandoffPayload) -> BlenderResult<()>;
}

/// Writes the hand-off to a fixed file path.
#[derive(Debug, Clone)]
pub struct HandoffFile {
    path: PathBuf,
}

impl HandoffFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HandoffSink for HandoffFile {
    fn write(&self, payload: &HandoffPayload) -> BlenderResult<()> {
        let json = payload.to_json_pretty()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BlenderError::HandoffWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|e| BlenderError::HandoffWrite {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(
            "Wrote {} parameters to {}",
            payload.params.len(),
            self.path.display()
        );
        Ok(())
    }
}
