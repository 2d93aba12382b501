//! Blender executable discovery.
//!
//! Resolution order:
//!
//! 1. The configured path, if it exists on disk
//! 2. Versioned subdirectories of the platform install roots, newest
//!    (lexicographically last) first
//! 3. The process search path
//! 4. The bare command name, which may fail to launch

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Bare command used when nothing else is found.
pub const DEFAULT_COMMAND: &str = "blender";

/// Where a resolved executable came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Configured,
    InstallDir,
    SearchPath,
    Fallback,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Configured => "configured path",
            ResolutionSource::InstallDir => "install directory",
            ResolutionSource::SearchPath => "PATH",
            ResolutionSource::Fallback => "fallback",
        }
    }
}

/// A resolved executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub path: PathBuf,
    pub source: ResolutionSource,
}

impl Resolution {
    /// True when nothing was found and the bare command name is used.
    pub fn is_fallback(&self) -> bool {
        self.source == ResolutionSource::Fallback
    }
}

/// A directory holding versioned installs, e.g. `Blender Foundation/Blender 4.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoot {
    pub dir: PathBuf,
    /// Subdirectory name prefix.
    pub prefix: String,
    /// Executable path relative to the versioned subdirectory.
    pub executable: PathBuf,
}

impl InstallRoot {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str, executable: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            executable: executable.into(),
        }
    }

    /// Newest matching executable under this root.
    fn newest(&self) -> Option<PathBuf> {
        let entries = std::fs::read_dir(&self.dir).ok()?;
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name.starts_with(&self.prefix))
            .collect();
        names.sort();
        names
            .iter()
            .rev()
            .map(|name| self.dir.join(name).join(&self.executable))
            .find(|candidate| candidate.is_file())
    }
}

/// Install roots for the current platform.
pub fn platform_install_roots() -> Vec<InstallRoot> {
    let mut roots = Vec::new();
    if cfg!(windows) {
        for var in ["LOCALAPPDATA", "ProgramFiles", "ProgramFiles(x86)"] {
            if let Some(base) = std::env::var_os(var) {
                let mut dir = PathBuf::from(base);
                if var == "LOCALAPPDATA" {
                    dir.push("Programs");
                }
                dir.push("Blender Foundation");
                roots.push(InstallRoot::new(dir, "Blender", "blender.exe"));
            }
        }
    } else if cfg!(target_os = "macos") {
        roots.push(InstallRoot::new(
            "/Applications",
            "Blender",
            Path::new("Contents").join("MacOS").join("Blender"),
        ));
    } else {
        roots.push(InstallRoot::new("/opt", "blender", "blender"));
        if let Some(data) = dirs::data_local_dir() {
            roots.push(InstallRoot::new(data, "blender", "blender"));
        }
    }
    roots
}

/// Finds the Blender executable.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    configured: Option<PathBuf>,
    install_roots: Vec<InstallRoot>,
    search_path: Option<OsString>,
    command: String,
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolLocator {
    /// Locator using the platform install roots and the process `PATH`.
    pub fn new() -> Self {
        Self {
            configured: None,
            install_roots: platform_install_roots(),
            search_path: std::env::var_os("PATH"),
            command: DEFAULT_COMMAND.to_string(),
        }
    }

    /// Sets the configured path. Empty strings are ignored.
    pub fn configured(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.configured = path
            .map(Into::into)
            .filter(|p: &PathBuf| !p.as_os_str().is_empty());
        self
    }

    /// Replaces the install roots.
    pub fn install_roots(mut self, roots: Vec<InstallRoot>) -> Self {
        self.install_roots = roots;
        self
    }

    /// Replaces the search path (`PATH` format).
    pub fn search_path(mut self, path: Option<OsString>) -> Self {
        self.search_path = path;
        self
    }

    /// Sets the bare command name.
    pub fn command(mut self, name: impl Into<String>) -> Self {
        self.command = name.into();
        self
    }

    pub fn configured_path(&self) -> Option<&Path> {
        self.configured.as_deref()
    }

    /// Resolves the executable. Never fails; see [`Resolution::is_fallback`].
    pub fn resolve(&self) -> Resolution {
        if let Some(path) = &self.configured {
            if path.exists() {
                return Resolution {
                    path: path.clone(),
                    source: ResolutionSource::Configured,
                };
            }
            tracing::warn!("Configured Blender path does not exist: {}", path.display());
        }

        for root in &self.install_roots {
            if let Some(path) = root.newest() {
                return Resolution {
                    path,
                    source: ResolutionSource::InstallDir,
                };
            }
        }

        if let Some(search) = &self.search_path {
            let cwd = std::env::current_dir().unwrap_or_default();
            if let Ok(path) = which::which_in(&self.command, Some(search), cwd) {
                return Resolution {
                    path,
                    source: ResolutionSource::SearchPath,
                };
            }
        }

        tracing::debug!("Blender not found, falling back to '{}'", self.command);
        Resolution {
            path: PathBuf::from(&self.command),
            source: ResolutionSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    fn empty_locator() -> ToolLocator {
        ToolLocator::new()
            .install_roots(Vec::new())
            .search_path(None)
    }

    #[test]
    fn test_configured_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("custom").join("blender");
        touch(&exe);
        let resolution = empty_locator().configured(Some(&exe)).resolve();
        assert_eq!(resolution.source, ResolutionSource::Configured);
        assert_eq!(resolution.path, exe);
    }

    #[test]
    fn test_missing_configured_path_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let resolution = empty_locator()
            .configured(Some(dir.path().join("nope")))
            .resolve();
        assert!(resolution.is_fallback());
        assert_eq!(resolution.path, PathBuf::from(DEFAULT_COMMAND));
    }

    #[test]
    fn test_install_dir_picks_lexicographically_last() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Blender 3.6").join("blender.exe"));
        touch(&dir.path().join("Blender 4.1").join("blender.exe"));
        std::fs::create_dir_all(dir.path().join("Blender 4.2")).unwrap();
        std::fs::create_dir_all(dir.path().join("Other")).unwrap();

        let resolution = empty_locator()
            .install_roots(vec![InstallRoot::new(dir.path(), "Blender", "blender.exe")])
            .resolve();
        assert_eq!(resolution.source, ResolutionSource::InstallDir);
        assert_eq!(resolution.path, dir.path().join("Blender 4.1").join("blender.exe"));
    }

    #[cfg(unix)]
    #[test]
    fn test_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("blender");
        touch(&exe);
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolution = empty_locator()
            .search_path(Some(dir.path().as_os_str().to_owned()))
            .resolve();
        assert_eq!(resolution.source, ResolutionSource::SearchPath);
        assert_eq!(resolution.path, exe);
    }

    #[test]
    fn test_empty_configured_path_ignored() {
        let locator = empty_locator().configured(Some(""));
        assert_eq!(locator.configured_path(), None);
    }
}
