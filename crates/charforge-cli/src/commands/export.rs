//! Export command implementation

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;

use crate::context;

/// Saves `name` as a preset, exports `exports/<name>.fbx` and optionally
/// copies it into another project.
pub fn run(base_dir: &Path, name: &str, preset: Option<&str>, copy_to: Option<&Path>) -> Result<ExitCode> {
    let mut system = context::system(base_dir, preset)?;

    let path = system.export_model(name)?;
    println!("{} Exported {}", "ok".green(), path.display());

    if let Some(dest) = copy_to {
        let copied = system.copy_export(name, dest)?;
        println!("{} Copied to {}", "ok".green(), copied.display());
    }
    Ok(ExitCode::SUCCESS)
}
