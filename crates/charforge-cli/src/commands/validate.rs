//! Validate command implementation

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use charforge_scene::validate_model;
use colored::Colorize;

/// Exit code 1 if the model has no meshes or cannot be read.
pub fn run(model: &Path, json: bool) -> Result<ExitCode> {
    let result = validate_model(model);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let status = if !result.is_valid {
            "INVALID".red().bold()
        } else if !result.has_rig {
            "UNRIGGED".yellow().bold()
        } else {
            "VALID".green().bold()
        };
        println!("{} {}", status, model.display());
        println!(
            "  meshes={}, nodes={}, hasSkin={}, hasRig={}",
            result.mesh_count, result.node_count, result.has_skin, result.has_rig
        );
        if let Some(message) = &result.message {
            println!("  {}", message);
        }
    }

    Ok(if result.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
