//! Cheap launchability probe (`blender --version`).

use std::process::{Command, Stdio};
use std::time::Duration;

use serde::Serialize;

use crate::capture::{take_output, SharedOutput};
use crate::error::{BlenderError, BlenderResult};
use crate::locate::Resolution;
use crate::orchestrator::{is_clean_exit, join_readers, spawn_error, start_readers, wait_with_timeout};

/// Bounded wait for the version probe.
pub const PROBE_TIMEOUT_SECS: u64 = 15;

/// Version reported by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolVersion {
    /// Version string, e.g. `4.1.0`, or `unknown` if the banner was not recognized.
    pub version: String,
    /// First line of output.
    pub banner: String,
}

impl std::fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.version)
    }
}

/// Extracts the version from `--version` output (`Blender 4.1.0 ...`).
pub fn parse_version(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("Blender ")?;
        let version = rest.split_whitespace().next()?;
        if version.chars().next()?.is_ascii_digit() {
            Some(version.to_string())
        } else {
            None
        }
    })
}

/// Runs `<tool> --version` with a bounded wait.
pub fn probe_version(tool: &Resolution, timeout: Duration) -> BlenderResult<ToolVersion> {
    let mut child = Command::new(&tool.path)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(tool, e))?;

    let captured = SharedOutput::default();
    let readers = start_readers(&mut child, None, &captured)?;
    let status = wait_with_timeout(&mut child, timeout);
    join_readers(readers);
    let status = status?;
    let output = take_output(&captured);

    if !is_clean_exit(&status) {
        tracing::warn!("{} --version exited with {}", tool.path.display(), status);
        return Err(BlenderError::ProbeFailed {
            stderr: output.stderr_text(),
        });
    }

    let stdout = output.stdout_text();
    let banner = stdout.lines().next().unwrap_or_default().trim().to_string();
    let version = parse_version(&stdout).unwrap_or_else(|| "unknown".to_string());
    tracing::debug!("{} reports version {}", tool.path.display(), version);
    Ok(ToolVersion { version, banner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("Blender 4.1.0\n\tbuild date: 2024-03-25\n"),
            Some("4.1.0".to_string())
        );
        assert_eq!(
            parse_version("Read prefs: ...\nBlender 3.6.5 (hash abc)"),
            Some("3.6.5".to_string())
        );
        assert_eq!(parse_version("Blender Foundation"), None);
        assert_eq!(parse_version("something else"), None);
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use pretty_assertions::assert_eq;
        use crate::locate::ResolutionSource;
        use crate::orchestrator::tests::fake_tool;

        fn resolution(path: std::path::PathBuf) -> Resolution {
            Resolution {
                path,
                source: ResolutionSource::Configured,
            }
        }

        #[test]
        fn test_probe_reports_version() {
            let dir = tempfile::tempdir().unwrap();
            let tool = fake_tool(dir.path(), "echo 'Blender 4.2.1'\necho 'build hash: x'");
            let version = probe_version(&resolution(tool), Duration::from_secs(5)).unwrap();
            assert_eq!(version.version, "4.2.1");
            assert_eq!(version.banner, "Blender 4.2.1");
        }

        #[test]
        fn test_probe_failure_keeps_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let tool = fake_tool(dir.path(), "echo 'libGL missing' >&2\nexit 2");
            let err = probe_version(&resolution(tool), Duration::from_secs(5)).unwrap_err();
            assert_eq!(err.info().detail.as_deref(), Some("libGL missing"));
        }

        #[test]
        fn test_probe_missing_configured_path() {
            let dir = tempfile::tempdir().unwrap();
            let err = probe_version(&resolution(dir.path().join("nope")), Duration::from_secs(1))
                .unwrap_err();
            assert!(matches!(err, BlenderError::PathInvalid { .. }));
        }
    }
}
