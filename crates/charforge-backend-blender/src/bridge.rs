//! High-level Blender operations: sculpt session, FBX export, smoke test.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BlenderError, BlenderResult};
use crate::locate::Resolution;
use crate::orchestrator::{LaunchHandle, LaunchOutcome, LaunchRequest, Orchestrator, OrchestratorConfig};
use crate::probe::{probe_version, ToolVersion};

/// Line the runtime smoke test prints on success.
pub const RUNTIME_SENTINEL: &str = "BLENDER_RUNTIME_OK";

/// Scripts the bridge runs inside Blender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPaths {
    /// Interactive sculpt session; reads the hand-off file.
    pub sculpt: PathBuf,
    /// Batch FBX export; takes the export name after `--`.
    pub export: PathBuf,
    /// Batch smoke test; prints [`RUNTIME_SENTINEL`].
    pub runtime_test: PathBuf,
}

impl ScriptPaths {
    /// Standard layout under a `tool_embed` directory.
    pub fn under(dir: &Path) -> Self {
        Self {
            sculpt: dir.join("apply_sculpt_standalone.py"),
            export: dir.join("scripts").join("export_fbx.py"),
            runtime_test: dir.join("blender_runtime_test.py"),
        }
    }
}

/// Entry point for everything that runs Blender.
#[derive(Debug, Clone)]
pub struct BlenderBridge {
    orchestrator: Orchestrator,
    scripts: ScriptPaths,
    exports_dir: PathBuf,
}

impl BlenderBridge {
    pub fn new(config: OrchestratorConfig, scripts: ScriptPaths, exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            orchestrator: Orchestrator::with_config(config),
            scripts,
            exports_dir: exports_dir.into(),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn scripts(&self) -> &ScriptPaths {
        &self.scripts
    }

    pub fn resolve_tool(&self) -> Resolution {
        self.orchestrator.resolve_tool()
    }

    /// Locates the tool and runs the version probe.
    pub fn probe(&self, timeout: Duration) -> BlenderResult<(Resolution, ToolVersion)> {
        let tool = self.resolve_tool();
        let version = probe_version(&tool, timeout)?;
        Ok((tool, version))
    }

    /// Opens an interactive sculpt session.
    pub fn launch_sculpt(&self) -> BlenderResult<LaunchHandle> {
        self.orchestrator
            .launch(LaunchRequest::interactive(&self.scripts.sculpt))
    }

    /// Where [`BlenderBridge::export_fbx`] writes `name`.
    pub fn export_path(&self, name: &str) -> PathBuf {
        self.exports_dir.join(format!("{}.fbx", name))
    }

    /// Runs the export script and returns the written FBX path.
    pub fn export_fbx(&self, name: &str) -> BlenderResult<PathBuf> {
        std::fs::create_dir_all(&self.exports_dir)?;
        let request = LaunchRequest::batch(&self.scripts.export).arg(name);
        self.orchestrator.run(request)?;

        let path = self.export_path(name);
        if !path.is_file() {
            return Err(BlenderError::OutputNotFound { path });
        }
        tracing::info!("Exported {}", path.display());
        Ok(path)
    }

    /// Runs the smoke-test script and checks for its sentinel.
    pub fn run_runtime_test(&self) -> BlenderResult<()> {
        match self
            .orchestrator
            .run(LaunchRequest::batch(&self.scripts.runtime_test))?
        {
            LaunchOutcome::Completed { output, .. } if output.stdout_contains(RUNTIME_SENTINEL) => {
                Ok(())
            }
            LaunchOutcome::Completed { output, .. } => Err(BlenderError::MissingSentinel {
                sentinel: RUNTIME_SENTINEL.to_string(),
                stdout: output.stdout_text(),
            }),
            LaunchOutcome::Running => Err(BlenderError::MissingSentinel {
                sentinel: RUNTIME_SENTINEL.to_string(),
                stdout: String::new(),
            }),
        }
    }

    /// Copies an exported FBX into another project's folder.
    pub fn copy_export(&self, name: &str, dest_dir: &Path) -> BlenderResult<PathBuf> {
        let from = self.export_path(name);
        if !from.is_file() {
            return Err(BlenderError::OutputNotFound { path: from });
        }
        if !dest_dir.is_dir() {
            return Err(BlenderError::InvalidDestination {
                path: dest_dir.to_path_buf(),
            });
        }
        let to = dest_dir.join(format!("{}.fbx", name));
        std::fs::copy(&from, &to).map_err(|e| BlenderError::CopyFailed {
            from: from.clone(),
            to: to.clone(),
            source: e,
        })?;
        tracing::info!("Copied {} to {}", from.display(), to.display());
        Ok(to)
    }
}
