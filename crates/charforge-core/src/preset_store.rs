//! One JSON file per named preset under `presets/`.

use std::path::{Path, PathBuf};

use charforge_spec::PresetData;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// Listing entry for a saved preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetSummary {
    pub name: String,
    pub nsfw: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `name`. Names must be plain file stems.
    pub fn path_for(&self, name: &str) -> CoreResult<PathBuf> {
        let invalid = name.trim().is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', ':'])
            || name.chars().any(char::is_control);
        if invalid {
            return Err(CoreError::InvalidPresetName {
                name: name.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn save(&self, name: &str, preset: &PresetData) -> CoreResult<PathBuf> {
        let path = self.path_for(name)?;
        let json = preset.to_json_pretty()?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CoreError::io("Failed to create", &self.dir, e))?;
        std::fs::write(&path, json).map_err(|e| CoreError::io("Failed to write", &path, e))?;
        tracing::info!("Saved preset '{}' to {}", name, path.display());
        Ok(path)
    }

    /// Reads a preset with the failure cause.
    pub fn try_load(&self, name: &str) -> CoreResult<PresetData> {
        let path = self.path_for(name)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::PresetNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(CoreError::io("Failed to read", &path, e)),
        };
        Ok(PresetData::from_json(&json)?)
    }

    /// Reads a preset; any failure is logged and yields `None`.
    pub fn load(&self, name: &str) -> Option<PresetData> {
        match self.try_load(name) {
            Ok(preset) => Some(preset),
            Err(e) => {
                tracing::warn!("Could not load preset '{}': {}", name, e);
                None
            }
        }
    }

    /// Saved presets sorted by name. Unreadable files are listed as non-NSFW.
    pub fn list(&self) -> Vec<PresetSummary> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut presets: Vec<PresetSummary> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let name = path.file_stem()?.to_string_lossy().into_owned();
                let nsfw = std::fs::read_to_string(&path)
                    .ok()
                    .and_then(|json| PresetData::from_json(&json).ok())
                    .is_some_and(|preset| preset.is_nsfw());
                Some(PresetSummary { name, nsfw, path })
            })
            .collect();
        presets.sort_by(|a, b| a.name.cmp(&b.name));
        presets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charforge_spec::CharacterState;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, PresetStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path().join("presets"));
        (dir, store)
    }

    #[test]
    fn test_save_load() {
        let (_dir, store) = store();
        let mut state = CharacterState::default();
        state.set_sculpt("height", 73);
        let preset = state.snapshot();

        let path = store.save("tall", &preset).unwrap();
        assert!(path.ends_with("presets/tall.json"));
        assert!(store.exists("tall"));
        assert_eq!(store.load("tall"), Some(preset));
    }

    #[test]
    fn test_load_failures_are_none() {
        let (_dir, store) = store();
        assert_eq!(store.load("missing"), None);
        assert!(matches!(
            store.try_load("missing"),
            Err(CoreError::PresetNotFound { .. })
        ));

        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join("broken.json"), "[1, 2").unwrap();
        assert_eq!(store.load("broken"), None);
    }

    #[test]
    fn test_rejects_path_like_names() {
        let (_dir, store) = store();
        for name in ["", "..", "a/b", "a\\b", "c:x"] {
            assert!(store.path_for(name).is_err(), "{:?}", name);
        }
        assert!(!store.exists("../config"));
    }

    #[test]
    fn test_list_sorted_with_nsfw() {
        let (_dir, store) = store();
        let mut state = CharacterState::default();
        state.set_nsfw(false);
        store.save("b_safe", &state.snapshot()).unwrap();
        state.set_nsfw(true);
        store.save("a_full", &state.snapshot()).unwrap();
        std::fs::write(store.dir().join("notes.txt"), "x").unwrap();

        let listed: Vec<(String, bool)> = store
            .list()
            .into_iter()
            .map(|p| (p.name, p.nsfw))
            .collect();
        assert_eq!(
            listed,
            vec![("a_full".to_string(), true), ("b_safe".to_string(), false)]
        );
    }
}
