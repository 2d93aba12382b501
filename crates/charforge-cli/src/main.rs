//! charforge CLI - console host for the character core
//!
//! Drives presets, previews, Blender sessions and diagnostics without a GUI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use charforge_cli::commands;
use charforge_spec::Gender;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// charforge - character creation toolkit
#[derive(Parser)]
#[command(name = "charforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Application base directory (assets/, presets/, tool_embed/)
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the readiness checks
    Doctor {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Also probe an AI companion service at this URL
        #[arg(long, value_name = "URL", num_args = 0..=1, default_missing_value = charforge_core::DEFAULT_COMPANION_URL)]
        companion: Option<String>,
    },

    /// Print scene statistics for a GLB file
    Inspect {
        model: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Check whether a GLB file is usable and rigged
    Validate {
        model: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Manage presets
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },

    /// Open an interactive Blender sculpt session
    Sculpt {
        /// Preset to load first
        #[arg(long)]
        preset: Option<String>,

        /// Sculpt values to set, as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,

        /// Open the session for auto-rigging
        #[arg(long)]
        auto_rig: bool,
    },

    /// Export the character to exports/<name>.fbx
    Export {
        name: String,

        /// Preset to load first
        #[arg(long)]
        preset: Option<String>,

        /// Copy the exported FBX into this directory
        #[arg(long, value_name = "DIR")]
        copy_to: Option<PathBuf>,
    },

    /// Show what the viewport would display
    Preview {
        #[arg(long)]
        preset: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Explain the latest failure in the session log, or answer a question
    Triage {
        /// Log file to read (default: error_log.txt in the base directory)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Ask a question instead
        #[arg(long, value_name = "QUESTION")]
        ask: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PresetCommands {
    /// List saved presets
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print a preset as JSON
    Show { name: String },
    /// Save the current state as a preset
    Save {
        name: String,

        /// Preset to start from
        #[arg(long)]
        from: Option<String>,

        /// Sculpt values to set, as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print config.json
    Show,
    /// Set the Blender executable path
    SetToolPath { path: PathBuf },
    /// Set the base model gender
    SetGender { gender: Gender },
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let base = cli.base_dir.as_path();

    let result = match cli.command {
        Commands::Doctor { json, companion } => {
            commands::doctor::run(base, json, companion.as_deref())
        }
        Commands::Inspect { model, json } => commands::inspect::run(&model, json),
        Commands::Validate { model, json } => commands::validate::run(&model, json),
        Commands::Preset { command } => match command {
            PresetCommands::List { json } => commands::preset::list(base, json),
            PresetCommands::Show { name } => commands::preset::show(base, &name),
            PresetCommands::Save { name, from, sets } => {
                commands::preset::save(base, &name, from.as_deref(), &sets)
            }
        },
        Commands::Sculpt {
            preset,
            sets,
            auto_rig,
        } => commands::sculpt::run(base, preset.as_deref(), &sets, auto_rig),
        Commands::Export {
            name,
            preset,
            copy_to,
        } => commands::export::run(base, &name, preset.as_deref(), copy_to.as_deref()),
        Commands::Preview { preset, json } => {
            commands::preview::run(base, preset.as_deref(), json)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(base),
            ConfigCommands::SetToolPath { path } => commands::config::set_tool_path(base, &path),
            ConfigCommands::SetGender { gender } => commands::config::set_gender(base, gender),
        },
        Commands::Triage { log, ask, json } => {
            commands::triage::run(base, log.as_deref(), ask.as_deref(), json)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
