//! Triage command implementation
//!
//! Reads the session log (or another file) and explains the most likely
//! problem, or answers a question.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use charforge_core::{analyze, answer, AppPaths, FixAction};
use colored::Colorize;

/// Only the tail of large logs is analyzed.
const TAIL_LINES: usize = 200;

pub fn run(base_dir: &Path, log: Option<&Path>, ask: Option<&str>, json: bool) -> Result<ExitCode> {
    if let Some(question) = ask {
        println!("{}", answer(question));
        return Ok(ExitCode::SUCCESS);
    }

    let log_path = log
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppPaths::new(base_dir).session_log());
    let text = std::fs::read_to_string(&log_path)
        .with_context(|| format!("Failed to read {}", log_path.display()))?;
    let lines: Vec<&str> = text.lines().collect();
    let tail = lines[lines.len().saturating_sub(TAIL_LINES)..].join("\n");
    let diagnosis = analyze(&tail);

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Problem:".bold(), diagnosis.problem);
    println!("{} {}", "Cause:".bold(), diagnosis.cause);
    println!("{} {}", "Try:".bold(), diagnosis.suggestion);
    if diagnosis.fix == Some(FixAction::OpenSettings) {
        println!(
            "  {}",
            "charforge config set-tool-path <path-to-blender>".cyan()
        );
    }
    Ok(ExitCode::SUCCESS)
}
