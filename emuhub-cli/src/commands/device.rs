//! `emuhub device`: create, list, show and delete deployed devices.

use clap::{Args, Subcommand};
use emuhub::device::{screen_preset, ScreenDimensions, ScreenPreset};
use emuhub::manager::ImageInstaller;

use super::common::{load_config, parse_key_value, CatalogArgs};
use crate::error::CliError;

/// Device subcommands.
#[derive(Debug, Subcommand)]
pub enum DeviceCommands {
    /// Deploy a new device from an installed image
    Create(CreateArgs),

    /// List deployed devices
    List,

    /// Print the configuration file of a device
    Show {
        /// Device name
        name: String,
    },

    /// Delete a device and its directory
    Delete {
        /// Device name
        name: String,
    },
}

/// Arguments for `emuhub device create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Unique device name
    pub name: String,

    /// Image identifier, as shown by `emuhub images`
    #[arg(long)]
    pub image: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Product preset name (see `emuhub presets`)
    #[arg(long, conflicts_with_all = ["diagonal", "density", "height", "width"])]
    pub preset: Option<String>,

    /// Screen diagonal in inches
    #[arg(long, requires_all = ["density", "height", "width"])]
    pub diagonal: Option<f64>,

    /// Screen density in dpi
    #[arg(long)]
    pub density: Option<u32>,

    /// Screen height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Screen width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Number of virtual CPUs
    #[arg(long)]
    pub cpu: Option<u32>,

    /// RAM size in MB
    #[arg(long)]
    pub ram: Option<u64>,

    /// Data disk size in MB
    #[arg(long)]
    pub disk: Option<u64>,

    /// Fixed debugging bridge port
    #[arg(long)]
    pub hdc_port: Option<u16>,

    /// Extra configuration entry (key=value), applied last
    #[arg(long = "set", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,

    /// Deploy even if the image is not installed yet
    #[arg(long)]
    pub force: bool,
}

/// Run a device subcommand.
pub fn run(command: DeviceCommands) -> Result<(), CliError> {
    match command {
        DeviceCommands::Create(args) => run_create(args),
        DeviceCommands::List => run_list(),
        DeviceCommands::Show { name } => run_show(&name),
        DeviceCommands::Delete { name } => run_delete(&name),
    }
}

fn run_create(args: CreateArgs) -> Result<(), CliError> {
    let config = load_config();
    let image = args.catalog.find_image(&args.image)?;

    if !args.force && !ImageInstaller::new(config.manager_config())?.is_installed(&image) {
        return Err(CliError::InvalidArgument(format!(
            "image '{}' is not installed. Run 'emuhub install {}' first or pass --force.",
            image.id(),
            image.id()
        )));
    }

    let screen = resolve_screen(&args)?;
    let mut options = config.device_options(&args.name, screen);
    if let Some(cpu) = args.cpu {
        options.cpu_number = cpu;
    }
    if let Some(ram) = args.ram {
        options.memory_ram_size = ram;
    }
    if let Some(disk) = args.disk {
        options.data_disk_size = disk;
    }
    options.hdc_port = args.hdc_port;
    options.overrides.extend(args.overrides);

    let record = config.deployer().deploy(&image, &options)?;

    println!("Created device '{}'", record.name);
    println!("  Type:   {}", record.device_type);
    println!("  Image:  {} (API {})", image.id(), record.api_version);
    println!(
        "  Screen: {}x{} @{}dpi, {}\"",
        record.resolution_width, record.resolution_height, record.density, record.diagonal_size
    );
    println!("  Path:   {}", record.path.display());

    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let deployer = load_config().deployer();
    let records = deployer.list()?;

    if records.is_empty() {
        println!("No devices deployed.");
        return Ok(());
    }

    for record in records {
        let state = if deployer.is_deployed(&record.name)? {
            "ready"
        } else {
            "missing config"
        };
        println!(
            "{:<20} {:<14} API {:<4} {:<6} {}",
            record.name, record.device_type, record.api_version, record.arch, state
        );
    }

    Ok(())
}

fn run_show(name: &str) -> Result<(), CliError> {
    let mapping = load_config().deployer().read_config(name)?;
    print!("{}", mapping.to_text());
    Ok(())
}

fn run_delete(name: &str) -> Result<(), CliError> {
    let record = load_config().deployer().undeploy(name)?;
    println!("Deleted device '{}' ({})", record.name, record.path.display());
    Ok(())
}

/// Resolve the screen from either a preset name or raw dimensions.
fn resolve_screen(args: &CreateArgs) -> Result<ScreenPreset, CliError> {
    if let Some(preset) = &args.preset {
        return Ok(screen_preset(preset)?);
    }

    match (args.diagonal, args.density, args.height, args.width) {
        (Some(diagonal), Some(density), Some(height), Some(width)) => {
            Ok(ScreenPreset::Raw(ScreenDimensions {
                diagonal,
                density,
                height,
                width,
            }))
        }
        _ => Err(CliError::InvalidArgument(
            "specify --preset or all of --diagonal, --density, --height and --width".to_string(),
        )),
    }
}
