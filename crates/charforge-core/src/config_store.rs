//! `config.json` persistence.
//!
//! The file is read fresh on every [`ConfigStore::load`] and overwritten in
//! full on every [`ConfigStore::save`]. A missing or corrupt file yields
//! defaults and never blocks startup.

use std::path::{Path, PathBuf};

use charforge_spec::Config;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config, falling back to defaults.
    pub fn load(&self) -> Config {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", self.path.display());
                return Config::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return Config::default();
            }
        };
        match Config::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Corrupt config {}, using defaults: {}",
                    self.path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> CoreResult<()> {
        let json = config
            .to_json_pretty()
            .map_err(charforge_spec::SpecError::Serialize)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::io("Failed to create", parent, e))?;
        }
        std::fs::write(&self.path, json)
            .map_err(|e| CoreError::io("Failed to write", &self.path, e))?;
        tracing::debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Load, modify, save. Returns the saved config.
    pub fn update(&self, f: impl FnOnce(&mut Config)) -> CoreResult<Config> {
        let mut config = self.load();
        f(&mut config);
        self.save(&config)?;
        Ok(config)
    }
}
