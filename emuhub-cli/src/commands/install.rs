//! `emuhub install`: download, verify and extract an image.

use std::sync::Arc;

use clap::Args;
use emuhub::manager::{ImageInstaller, ProgressCallback, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};

use super::common::{ctrl_c_token, format_bytes, load_config, runtime, CatalogArgs};
use crate::error::CliError;

/// Arguments for `emuhub install`.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Image identifier, as shown by `emuhub images`
    pub image: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Keep the downloaded archive in the cache
    #[arg(long)]
    pub keep_archive: bool,
}

/// Install an image.
pub fn run(args: InstallArgs) -> Result<(), CliError> {
    let config = load_config();
    let image = args.catalog.find_image(&args.image)?;

    let mut manager_config = config.manager_config();
    if args.keep_archive {
        manager_config = manager_config.with_keep_archive(true);
    }
    let installer = ImageInstaller::new(manager_config)?;

    if installer.is_installed(&image) {
        println!("{} is already installed.", image.id());
        return Ok(());
    }

    let cancel = ctrl_c_token()?;
    let bar = progress_bar();
    let callback = progress_callback(bar.clone());

    println!("Installing {} ({} {})", image.id(), image.os, image.version);

    let rt = runtime()?;
    let result = rt.block_on(installer.install(&image, &cancel, Some(callback)));

    match result {
        Ok(result) => {
            bar.finish_with_message("done");
            if result.resumed_from > 0 {
                println!("Resumed from {}", format_bytes(result.resumed_from));
            }
            println!(
                "Installed {} files into {}",
                result.extracted.files,
                result.image_path.display()
            );
            Ok(())
        }
        Err(e) => {
            bar.abandon();
            Err(e.into())
        }
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::with_template("{prefix:>9} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn progress_callback(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |event: ProgressEvent| match event {
        ProgressEvent::Download(progress) => {
            bar.set_prefix("download");
            bar.set_position(progress.percentage as u64);
            bar.set_message(format!(
                "{:.1} {}",
                progress.rate,
                progress.rate_unit.suffix()
            ));
        }
        ProgressEvent::Extract(progress) => {
            bar.set_prefix("extract");
            bar.set_position(progress.percentage as u64);
            bar.set_message(String::new());
        }
    })
}
