//! Error types for the external tool bridge.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type for bridge operations.
pub type BlenderResult<T> = Result<T, BlenderError>;

/// Coarse failure category shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlenderErrorCode {
    NotInstalled,
    PathInvalid,
    ProcessStartFailed,
    ProcessExitedUnexpectedly,
    PermissionDenied,
    ScriptNotFound,
    Timeout,
    Unknown,
}

impl BlenderErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlenderErrorCode::NotInstalled => "not_installed",
            BlenderErrorCode::PathInvalid => "path_invalid",
            BlenderErrorCode::ProcessStartFailed => "process_start_failed",
            BlenderErrorCode::ProcessExitedUnexpectedly => "process_exited_unexpectedly",
            BlenderErrorCode::PermissionDenied => "permission_denied",
            BlenderErrorCode::ScriptNotFound => "script_not_found",
            BlenderErrorCode::Timeout => "timeout",
            BlenderErrorCode::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for BlenderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure record delivered to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlenderErrorInfo {
    pub code: BlenderErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

impl std::fmt::Display for BlenderErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  detail: {}", detail)?;
        }
        if let Some(fix) = &self.suggested_fix {
            write!(f, "\n  fix: {}", fix)?;
        }
        Ok(())
    }
}

/// Errors that can occur while driving the external tool.
#[derive(Debug, Error)]
pub enum BlenderError {
    /// No executable found and the bare command could not be started.
    #[error("Blender executable not found")]
    NotInstalled,

    /// A configured path does not point at an executable.
    #[error("Blender path is invalid: {path}")]
    PathInvalid { path: PathBuf },

    /// The process could not be spawned.
    #[error("Failed to start Blender at {path}: {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch run exited with a failing status.
    #[error("Blender exited with {}", describe_exit(.exit_code))]
    ExitedUnexpectedly {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// An interactive session closed inside the grace window.
    #[error("Blender closed within {grace_secs} seconds of launch ({})", describe_exit(.exit_code))]
    ExitedEarly {
        exit_code: Option<i32>,
        grace_secs: u64,
        stderr: String,
    },

    /// The OS refused access to the executable or a file.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required script is missing.
    #[error("Script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    /// The process did not finish in time and was killed.
    #[error("Blender timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// `--version` did not report a usable version.
    #[error("Blender version probe failed")]
    ProbeFailed { stderr: String },

    /// The smoke-test script ran but never printed its sentinel.
    #[error("Runtime test did not print {sentinel}")]
    MissingSentinel { sentinel: String, stdout: String },

    /// Writing the parameter hand-off file failed.
    #[error("Failed to write hand-off file {path}: {source}")]
    HandoffWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the parameter hand-off failed.
    #[error("Failed to serialize hand-off parameters: {0}")]
    HandoffSerialize(#[source] serde_json::Error),

    /// A batch run succeeded but its expected output is missing.
    #[error("Expected output file not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// A copy destination is not an existing directory.
    #[error("Invalid destination directory: {path}")]
    InvalidDestination { path: PathBuf },

    /// Copying an exported file failed.
    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The supervisor thread went away before reporting.
    #[error("Lost contact with the Blender supervisor")]
    SupervisorLost,

    /// IO error during process management.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

impl BlenderError {
    /// Creates a new exited-unexpectedly error.
    pub fn exited_unexpectedly(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ExitedUnexpectedly {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Stable identifier for logs and support requests.
    pub fn code(&self) -> &'static str {
        match self {
            BlenderError::NotInstalled => "BLENDER_001",
            BlenderError::PathInvalid { .. } => "BLENDER_002",
            BlenderError::SpawnFailed { .. } => "BLENDER_003",
            BlenderError::ExitedUnexpectedly { .. } => "BLENDER_004",
            BlenderError::ExitedEarly { .. } => "BLENDER_005",
            BlenderError::PermissionDenied { .. } => "BLENDER_006",
            BlenderError::ScriptNotFound { .. } => "BLENDER_007",
            BlenderError::Timeout { .. } => "BLENDER_008",
            BlenderError::ProbeFailed { .. } => "BLENDER_009",
            BlenderError::MissingSentinel { .. } => "BLENDER_010",
            BlenderError::HandoffWrite { .. } => "BLENDER_011",
            BlenderError::HandoffSerialize(_) => "BLENDER_012",
            BlenderError::OutputNotFound { .. } => "BLENDER_013",
            BlenderError::InvalidDestination { .. } => "BLENDER_014",
            BlenderError::CopyFailed { .. } => "BLENDER_015",
            BlenderError::SupervisorLost => "BLENDER_016",
            BlenderError::Io(_) => "BLENDER_017",
        }
    }

    /// User-facing category.
    pub fn kind(&self) -> BlenderErrorCode {
        match self {
            BlenderError::NotInstalled => BlenderErrorCode::NotInstalled,
            BlenderError::PathInvalid { .. } | BlenderError::InvalidDestination { .. } => {
                BlenderErrorCode::PathInvalid
            }
            BlenderError::SpawnFailed { .. } | BlenderError::ProbeFailed { .. } => {
                BlenderErrorCode::ProcessStartFailed
            }
            BlenderError::ExitedUnexpectedly { .. } | BlenderError::ExitedEarly { .. } => {
                BlenderErrorCode::ProcessExitedUnexpectedly
            }
            BlenderError::PermissionDenied { .. } => BlenderErrorCode::PermissionDenied,
            BlenderError::ScriptNotFound { .. } => BlenderErrorCode::ScriptNotFound,
            BlenderError::Timeout { .. } => BlenderErrorCode::Timeout,
            BlenderError::HandoffWrite { source, .. } | BlenderError::CopyFailed { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                BlenderErrorCode::PermissionDenied
            }
            _ => BlenderErrorCode::Unknown,
        }
    }

    /// Captured process output attached to this error, if any.
    pub fn detail(&self) -> Option<String> {
        let text = match self {
            BlenderError::ExitedUnexpectedly { stderr, .. }
            | BlenderError::ExitedEarly { stderr, .. }
            | BlenderError::ProbeFailed { stderr } => stderr.trim(),
            BlenderError::MissingSentinel { stdout, .. } => stdout.trim(),
            BlenderError::SpawnFailed { source, .. }
            | BlenderError::PermissionDenied { source, .. }
            | BlenderError::HandoffWrite { source, .. }
            | BlenderError::CopyFailed { source, .. } => return Some(source.to_string()),
            _ => "",
        };
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Remediation hint for the user.
    pub fn suggested_fix(&self) -> Option<&'static str> {
        let fix = match self.kind() {
            BlenderErrorCode::NotInstalled => {
                "Install Blender from https://www.blender.org/download/ or set its path in Settings."
            }
            BlenderErrorCode::PathInvalid => "Open Settings and select the Blender executable.",
            BlenderErrorCode::ProcessStartFailed => {
                "Check that the Blender executable runs from a terminal with --version."
            }
            BlenderErrorCode::ProcessExitedUnexpectedly => {
                "Check the captured output and the session log for the Blender error."
            }
            BlenderErrorCode::PermissionDenied => {
                "Run from a folder you can write to, or fix the file permissions."
            }
            BlenderErrorCode::ScriptNotFound => {
                "Restore the tool_embed folder from the original installation."
            }
            BlenderErrorCode::Timeout => "Close other Blender instances and try again.",
            BlenderErrorCode::Unknown => return None,
        };
        Some(fix)
    }

    /// Converts the error into the structured record delivered to the host.
    pub fn info(&self) -> BlenderErrorInfo {
        BlenderErrorInfo {
            code: self.kind(),
            message: format!("{} ({})", self, self.code()),
            detail: self.detail(),
            suggested_fix: self.suggested_fix().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let err = BlenderError::Timeout { timeout_secs: 300 };
        assert!(err.to_string().contains("300 seconds"));

        let err = BlenderError::exited_unexpectedly(Some(3), "Traceback");
        assert_eq!(err.to_string(), "Blender exited with exit code 3");

        let err = BlenderError::ExitedEarly {
            exit_code: Some(0),
            grace_secs: 5,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("within 5 seconds"));
    }

    #[test]
    fn test_info_carries_detail_and_fix() {
        let info = BlenderError::exited_unexpectedly(Some(1), "  bpy failed\n").info();
        assert_eq!(info.code, BlenderErrorCode::ProcessExitedUnexpectedly);
        assert_eq!(info.detail.as_deref(), Some("bpy failed"));
        assert!(info.message.contains("BLENDER_004"));
        assert!(info.suggested_fix.is_some());
    }

    #[test]
    fn test_permission_denied_io_is_classified() {
        let err = BlenderError::HandoffWrite {
            path: PathBuf::from("tool_embed/sculpt_input.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.kind(), BlenderErrorCode::PermissionDenied);

        let err = BlenderError::HandoffWrite {
            path: PathBuf::from("tool_embed/sculpt_input.json"),
            source: std::io::Error::from(std::io::ErrorKind::Other),
        };
        assert_eq!(err.kind(), BlenderErrorCode::Unknown);
        assert_eq!(err.info().suggested_fix, None);
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            BlenderError::NotInstalled,
            BlenderError::PathInvalid {
                path: PathBuf::new(),
            },
            BlenderError::ScriptNotFound {
                path: PathBuf::new(),
            },
            BlenderError::Timeout { timeout_secs: 1 },
            BlenderError::SupervisorLost,
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_info_display() {
        let info = BlenderError::NotInstalled.info();
        let text = info.to_string();
        assert!(text.starts_with("[not_installed]"));
        assert!(text.contains("fix:"));
    }
}
