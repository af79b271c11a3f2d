//! Emuhub CLI - Command-line interface
//!
//! Downloads emulator images and manages deployed emulator devices.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use emuhub::config::default_log_dir;
use emuhub::logging;

use commands::config::ConfigCommands;
use commands::device::DeviceCommands;
use commands::images::ImagesArgs;
use commands::install::InstallArgs;
use commands::presets::PresetsArgs;
use error::CliError;

/// Emulator image and device manager.
#[derive(Debug, Parser)]
#[command(name = "emuhub", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List images in the catalog
    Images(ImagesArgs),

    /// Download, verify and extract an image
    Install(InstallArgs),

    /// List built-in product presets
    Presets(PresetsArgs),

    /// Manage deployed devices
    #[command(subcommand)]
    Device(DeviceCommands),

    /// View or modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let _guard = match logging::init_logging(&default_log_dir(), cli.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    if let Err(e) = run(cli.command) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Images(args) => commands::images::run(args),
        Commands::Install(args) => commands::install::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Device(command) => commands::device::run(command),
        Commands::Config(command) => commands::config::run(command),
    }
}
