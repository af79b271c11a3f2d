//! Common helpers shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use emuhub::config::{default_base_dir, ConfigFile};
use emuhub::image::{ImageCatalog, ImageDescriptor, JsonCatalog};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

/// File name of the cached catalog listing.
const CATALOG_FILE_NAME: &str = "catalog.json";

/// Catalog selection shared by commands that look up images.
#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Catalog listing file (defaults to ~/.emuhub/catalog.json)
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl CatalogArgs {
    /// Open the selected catalog.
    pub fn open(&self) -> JsonCatalog {
        JsonCatalog::new(
            self.catalog
                .clone()
                .unwrap_or_else(|| default_base_dir().join(CATALOG_FILE_NAME)),
        )
    }

    /// Look up an image by identifier.
    pub fn find_image(&self, id: &str) -> Result<ImageDescriptor, CliError> {
        self.open()
            .find(id)?
            .ok_or_else(|| CliError::ImageNotFound(id.to_string()))
    }
}

/// Load config or return default.
pub fn load_config() -> ConfigFile {
    ConfigFile::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        ConfigFile::default()
    })
}

/// Build the multi-threaded runtime used by async commands.
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::RuntimeCreation(e.to_string()))
}

/// Cancellation token triggered by Ctrl+C.
pub fn ctrl_c_token() -> Result<CancellationToken, CliError> {
    let token = CancellationToken::new();
    let handler_token = token.clone();

    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, cancelling...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    Ok(token)
}

/// Parse a `key=value` override.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Format a byte count for display.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
