//! Shared setup for commands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use charforge_core::{AppPaths, CharacterSystem, Services};

use crate::console::{ConsoleNotifier, ConsoleViewport};

/// Services rooted at `base_dir`, logging to its `error_log.txt`.
pub fn services(base_dir: &Path) -> Services {
    Services::open(AppPaths::new(base_dir))
}

/// A started character system with a console host.
///
/// With `preset`, that preset is loaded after startup and must exist.
pub fn system(base_dir: &Path, preset: Option<&str>) -> Result<CharacterSystem> {
    let mut system = CharacterSystem::new(
        services(base_dir),
        Box::new(ConsoleViewport),
        Box::new(ConsoleNotifier),
    );
    system.startup();
    if let Some(name) = preset {
        if !system.load_preset(name) {
            bail!("Preset '{}' could not be loaded", name);
        }
    }
    Ok(system)
}

/// Parses `key=value` sculpt assignments.
pub fn parse_assignment(raw: &str) -> Result<(String, i32)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty parameter name in '{}'", raw);
    }
    let value = value
        .trim()
        .parse::<i32>()
        .with_context(|| format!("'{}' is not an integer", value.trim()))?;
    Ok((key.to_string(), value))
}

/// Applies `key=value` assignments through the system.
pub fn apply_assignments(system: &mut CharacterSystem, assignments: &[String]) -> Result<()> {
    for raw in assignments {
        let (key, value) = parse_assignment(raw)?;
        let stored = system.update_sculpt_value(&key, value);
        if stored != value {
            tracing::warn!("{} clamped from {} to {}", key, value, stored);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("height=80").unwrap(), ("height".to_string(), 80));
        assert_eq!(parse_assignment(" hip_width = 5 ").unwrap(), ("hip_width".to_string(), 5));
        assert!(parse_assignment("height").is_err());
        assert!(parse_assignment("=3").is_err());
        assert!(parse_assignment("height=tall").is_err());
    }
}
