//! Preview command implementation
//!
//! Prints what the viewport would show for the current state.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use charforge_core::PreviewPlan;
use colored::Colorize;

use crate::context;

pub fn run(base_dir: &Path, preset: Option<&str>, json: bool) -> Result<ExitCode> {
    let system = context::system(base_dir, preset)?;
    let plan = system.preview_plan();

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(ExitCode::SUCCESS);
    }

    match &plan {
        PreviewPlan::Model { path, transform } => {
            println!("{} {}", "Model:".bold(), path.display());
            match transform {
                Some(t) => println!(
                    "  scale {:.3} about {:?}, offset {:?}",
                    t.scale,
                    t.pivot.to_array(),
                    t.offset.to_array()
                ),
                None => println!("  {}", "sliders do not deform this model".yellow()),
            }
        }
        PreviewPlan::Image { path } => println!("{} {}", "Image:".bold(), path.display()),
        PreviewPlan::Placeholder { reason } => {
            println!("{} {}", "Placeholder:".bold(), reason.dimmed())
        }
    }
    Ok(ExitCode::SUCCESS)
}
