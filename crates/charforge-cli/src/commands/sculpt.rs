//! Sculpt command implementation
//!
//! Writes the hand-off file and opens an interactive Blender session.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;

use crate::context;

pub fn run(base_dir: &Path, preset: Option<&str>, sets: &[String], auto_rig: bool) -> Result<ExitCode> {
    let mut system = context::system(base_dir, preset)?;
    context::apply_assignments(&mut system, sets)?;

    let handle = if auto_rig {
        system.create_auto_rig()
    } else {
        system.sculpt()
    };
    let Some(handle) = handle else {
        return Ok(ExitCode::from(1));
    };

    println!(
        "{} Launched {} (pid {})",
        "->".green(),
        handle.tool().display(),
        handle.pid()
    );
    if system.await_launch(handle) {
        println!("{} Sculpt session is running", "ok".green());
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
