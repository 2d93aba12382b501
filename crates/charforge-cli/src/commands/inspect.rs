//! Inspect command implementation
//!
//! Loads a GLB and prints its scene statistics, bounds and load decision.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use charforge_core::{classify_load, LoadDecision};
use charforge_scene::{parse_scene, validate_scene};
use colored::Colorize;
use serde_json::json;

pub fn run(model: &Path, json_output: bool) -> Result<ExitCode> {
    let scene = parse_scene(model).with_context(|| format!("Failed to load {}", model.display()))?;
    let stats = scene.stats();
    let validation = validate_scene(&scene);
    let decision = classify_load(&validation);
    let bounds = scene.world_bounds();

    if json_output {
        let report = json!({
            "path": model.display().to_string(),
            "stats": stats,
            "validation": validation,
            "decision": decision,
            "bounds": bounds.map(|b| json!({
                "min": b.min.to_array(),
                "max": b.max.to_array(),
                "center": b.center().to_array(),
            })),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Model:".bold(), model.display());
    println!("  meshes     {}", stats.mesh_count);
    println!("  nodes      {}", stats.node_count);
    println!("  skins      {}", stats.skin_count);
    println!("  drawables  {}", stats.drawable_count);
    println!("  vertices   {}", stats.vertex_count);
    println!("  triangles  {}", stats.triangle_count);
    if let Some(b) = bounds {
        println!("  bounds     {:?} .. {:?}", b.min.to_array(), b.max.to_array());
    }
    for mesh in &scene.meshes {
        println!(
            "  mesh '{}': {} primitives",
            mesh.name.as_deref().unwrap_or("<unnamed>"),
            mesh.primitives.len()
        );
    }

    match &decision {
        LoadDecision::ProceedSilently => println!("{} rigged, sliders will deform", "ok".green()),
        LoadDecision::ProceedWithWarning(msg) => println!("{} {}", "!!".yellow(), msg),
        LoadDecision::Block(msg) => println!("{} {}", "!!".red(), msg),
    }
    Ok(ExitCode::SUCCESS)
}
