//! Doctor command implementation
//!
//! Runs the readiness checks and prints a colored report.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use charforge_core::{CheckStatus, ReadinessEngine, ReadinessReport};
use colored::Colorize;

use crate::context;

/// Run the doctor command
///
/// # Returns
/// Exit code: 0 if every critical check passes, 1 otherwise
pub fn run(base_dir: &Path, json: bool, companion_url: Option<&str>) -> Result<ExitCode> {
    let services = context::services(base_dir);
    let mut engine = ReadinessEngine::new(
        services.paths.clone(),
        services.log.clone(),
        services.blender(),
    );
    if let Some(url) = companion_url {
        engine = engine.companion_url(url);
    }
    let report = engine.run();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.all_critical_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_report(report: &ReadinessReport) {
    println!("{}", "charforge Doctor".cyan().bold());
    println!("{}", "================".cyan());
    println!();

    for check in &report.checks {
        let tag = match check.result.status {
            CheckStatus::Pass => "ok".green(),
            CheckStatus::Fail if check.critical => "!!".red(),
            CheckStatus::Fail | CheckStatus::Warn => "!!".yellow(),
            CheckStatus::Skip => "--".dimmed(),
        };
        println!(
            "  {} {}. {}: {}",
            tag,
            check.step,
            check.name.bold(),
            check.result.message
        );
        if let Some(fix) = &check.result.suggested_fix {
            println!("       {}", fix.dimmed());
        }
    }

    println!();
    for line in &report.summary_lines {
        println!("  {}", line);
    }
    if let Some(path) = &report.log_path {
        println!();
        println!("  {} {}", "Log:".dimmed(), path.display());
    }
    println!();

    if report.all_critical_passed {
        println!("{} All critical checks passed!", "SUCCESS".green().bold());
    } else {
        println!(
            "{} Critical checks failed. See above for details.",
            "FAILED".red().bold()
        );
    }
}
