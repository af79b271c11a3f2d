//! `emuhub presets`: list built-in product presets.

use clap::Args;
use emuhub::device::{presets, presets_for_device_type};

use crate::error::CliError;

/// Arguments for `emuhub presets`.
#[derive(Debug, Args)]
pub struct PresetsArgs {
    /// Only show presets of this device type
    #[arg(long)]
    pub device_type: Option<String>,
}

/// List presets.
pub fn run(args: PresetsArgs) -> Result<(), CliError> {
    let presets = match &args.device_type {
        Some(device_type) => presets_for_device_type(device_type),
        None => presets().iter().collect(),
    };

    if presets.is_empty() {
        println!("No presets found.");
        return Ok(());
    }

    for preset in presets {
        let screen = &preset.screen;
        let outer = preset
            .outer
            .as_ref()
            .and_then(|outer| outer.complete())
            .map(|outer| format!("  outer {}\" {}x{}", outer.diagonal, outer.width, outer.height))
            .unwrap_or_default();

        println!(
            "{:<16} {:<14} {}\" {}x{} @{}dpi{}",
            preset.name,
            preset.device_type,
            screen.diagonal,
            screen.width,
            screen.height,
            screen.density,
            outer
        );
    }

    Ok(())
}
