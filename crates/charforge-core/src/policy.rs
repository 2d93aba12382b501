//! Decides what a model load means for the user and for deformation.

use charforge_scene::ValidationResult;
use serde::Serialize;

/// Outcome of classifying a validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "message", rename_all = "snake_case")]
pub enum LoadDecision {
    /// Valid and rigged.
    ProceedSilently,
    /// Usable geometry, but sliders may not deform it.
    ProceedWithWarning(String),
    /// Nothing usable to deform.
    Block(String),
}

impl LoadDecision {
    /// True when slider-driven deformation should be applied.
    pub fn allows_deformation(&self) -> bool {
        matches!(self, LoadDecision::ProceedSilently)
    }

    /// True when the whole-model viewport transform may be applied.
    pub fn allows_transform(&self) -> bool {
        !self.is_blocked()
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, LoadDecision::Block(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadDecision::ProceedSilently => None,
            LoadDecision::ProceedWithWarning(msg) | LoadDecision::Block(msg) => Some(msg),
        }
    }
}

/// Classifies validator output. Called once per model load.
pub fn classify_load(result: &ValidationResult) -> LoadDecision {
    let message = || {
        result
            .message
            .clone()
            .unwrap_or_else(|| "Model failed validation.".to_string())
    };
    if !result.is_valid {
        LoadDecision::Block(message())
    } else if !result.has_rig {
        LoadDecision::ProceedWithWarning(message())
    } else {
        LoadDecision::ProceedSilently
    }
}
