//! Fixed file layout under the application base directory.

use std::path::{Path, PathBuf};

use charforge_backend_blender::ScriptPaths;
use charforge_spec::Gender;

pub const CONFIG_FILE: &str = "config.json";
pub const SESSION_LOG_FILE: &str = "error_log.txt";
pub const PRESETS_DIR: &str = "presets";
pub const TOOL_EMBED_DIR: &str = "tool_embed";
pub const HANDOFF_FILE: &str = "sculpt_input.json";
pub const EXPORTS_DIR: &str = "exports";
pub const BASE_MODEL_EXTENSION: &str = "glb";

/// Every path the core reads or writes, derived from one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    base: PathBuf,
}

impl AppPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join(CONFIG_FILE)
    }

    pub fn session_log(&self) -> PathBuf {
        self.base.join(SESSION_LOG_FILE)
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.base.join(PRESETS_DIR)
    }

    pub fn tool_embed_dir(&self) -> PathBuf {
        self.base.join(TOOL_EMBED_DIR)
    }

    pub fn handoff_file(&self) -> PathBuf {
        self.tool_embed_dir().join(HANDOFF_FILE)
    }

    pub fn scripts(&self) -> ScriptPaths {
        ScriptPaths::under(&self.tool_embed_dir())
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.base.join("assets")
    }

    /// `assets/characters/{gender}_base.glb`
    pub fn base_model(&self, gender: Gender) -> PathBuf {
        self.assets_dir()
            .join("characters")
            .join(format!("{}_base.{}", gender, BASE_MODEL_EXTENSION))
    }

    /// `assets/view_preview/{name}.png`
    pub fn preview_image(&self, name: &str) -> PathBuf {
        self.assets_dir()
            .join("view_preview")
            .join(format!("{}.png", name))
    }

    pub fn body_parameters(&self) -> PathBuf {
        self.assets_dir().join("body_parameters.json")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.base.join(EXPORTS_DIR)
    }

    /// Asset files that must exist for the editor to be usable.
    pub fn required_assets(&self) -> Vec<PathBuf> {
        let mut required: Vec<PathBuf> = Gender::all()
            .into_iter()
            .map(|g| self.base_model(g))
            .collect();
        required.push(self.preview_image("skin"));
        required.push(self.body_parameters());
        required
    }

    /// Scripts the sculpt and export operations cannot run without.
    pub fn required_scripts(&self) -> Vec<PathBuf> {
        let scripts = self.scripts();
        vec![scripts.sculpt, scripts.export]
    }
}
