//! Preset commands: list, show, save.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Result};
use colored::Colorize;

use crate::context;

pub fn list(base_dir: &Path, json: bool) -> Result<ExitCode> {
    let presets = context::services(base_dir).presets.list();
    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
        return Ok(ExitCode::SUCCESS);
    }
    if presets.is_empty() {
        println!("{}", "No presets saved.".dimmed());
    }
    for preset in presets {
        let tag = if preset.nsfw { " [nsfw]".yellow() } else { "".normal() };
        println!("  {}{}", preset.name, tag);
    }
    Ok(ExitCode::SUCCESS)
}

pub fn show(base_dir: &Path, name: &str) -> Result<ExitCode> {
    let preset = context::services(base_dir).presets.try_load(name)?;
    println!("{}", preset.to_json_pretty()?);
    Ok(ExitCode::SUCCESS)
}

/// Starts from the current state, applies `sets`, saves as `name`.
pub fn save(base_dir: &Path, name: &str, from: Option<&str>, sets: &[String]) -> Result<ExitCode> {
    let mut system = context::system(base_dir, from)?;
    context::apply_assignments(&mut system, sets)?;
    if !system.save_preset(name) {
        bail!("Could not save preset '{}'; see error_log.txt", name);
    }
    println!("{} Saved preset '{}'", "ok".green(), name);
    Ok(ExitCode::SUCCESS)
}
