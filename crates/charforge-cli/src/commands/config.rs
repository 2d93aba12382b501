//! Config commands: show, set-tool-path, set-gender.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Result};
use charforge_spec::Gender;
use colored::Colorize;

use crate::context;

pub fn show(base_dir: &Path) -> Result<ExitCode> {
    let store = context::services(base_dir).config;
    let config = store.load();
    println!("{}", config.to_json_pretty()?);
    println!("{} {}", "file:".dimmed(), store.path().display());
    Ok(ExitCode::SUCCESS)
}

pub fn set_tool_path(base_dir: &Path, path: &Path) -> Result<ExitCode> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }
    let store = context::services(base_dir).config;
    store.update(|c| c.blender_path = path.display().to_string())?;
    println!("{} Blender path set to {}", "ok".green(), path.display());
    Ok(ExitCode::SUCCESS)
}

pub fn set_gender(base_dir: &Path, gender: Gender) -> Result<ExitCode> {
    let mut system = context::system(base_dir, None)?;
    let loaded = system.set_gender(gender);
    println!("{} Gender set to {}", "ok".green(), gender);
    if !loaded {
        println!(
            "  {} {}",
            "no base model at".yellow(),
            system.current_model_path().display()
        );
    }
    Ok(ExitCode::SUCCESS)
}
