//! `emuhub images`: list catalog images and their install state.

use clap::Args;
use emuhub::image::ImageCatalog;
use emuhub::manager::ImageInstaller;

use super::common::{format_bytes, load_config, CatalogArgs};
use crate::error::CliError;

/// Arguments for `emuhub images`.
#[derive(Debug, Args)]
pub struct ImagesArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Only show images of this device type
    #[arg(long)]
    pub device_type: Option<String>,
}

/// List catalog images.
pub fn run(args: ImagesArgs) -> Result<(), CliError> {
    let config = load_config();
    let installer = ImageInstaller::new(config.manager_config())?;
    let images = args.catalog.open().images()?;

    let images: Vec<_> = images
        .into_iter()
        .filter(|image| {
            args.device_type
                .as_deref()
                .map_or(true, |device_type| image.device_type == device_type)
        })
        .collect();

    if images.is_empty() {
        println!("No images found.");
        return Ok(());
    }

    for image in &images {
        let state = if installer.is_installed(image) {
            "installed"
        } else {
            "-"
        };
        let size = image.size.map(format_bytes).unwrap_or_default();
        println!(
            "{:<48} {:<8} {:<6} {:<6} {:>10}  {}",
            image.id(),
            image.device_type,
            image.api_level,
            image.arch,
            size,
            state
        );
    }

    Ok(())
}
