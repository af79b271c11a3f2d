//! CLI error type.

use std::fmt;

use emuhub::config::ConfigError;
use emuhub::device::DeviceError;
use emuhub::image::CatalogError;
use emuhub::manager::ManagerError;
use emuhub::registry::RegistryError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),

    /// The image catalog could not be read.
    Catalog(CatalogError),

    /// No image with this identifier is in the catalog.
    ImageNotFound(String),

    /// Invalid device arguments.
    Device(DeviceError),

    /// Image download, verification or extraction failed.
    Install(ManagerError),

    /// Registry operation failed.
    Registry(RegistryError),

    /// Invalid command-line arguments.
    InvalidArgument(String),

    /// Failed to create the Tokio runtime.
    RuntimeCreation(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Catalog(e) => write!(f, "Image catalog error: {}", e),
            CliError::ImageNotFound(id) => write!(
                f,
                "Image '{}' not found. Use 'emuhub images' to see available images.",
                id
            ),
            CliError::Device(e) => write!(f, "Invalid device: {}", e),
            CliError::Install(ManagerError::Cancelled) => {
                write!(f, "Installation cancelled. Run the command again to resume.")
            }
            CliError::Install(e) => write!(f, "Installation failed: {}", e),
            CliError::Registry(e) => write!(f, "{}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::RuntimeCreation(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Catalog(e) => Some(e),
            CliError::Device(e) => Some(e),
            CliError::Install(e) => Some(e),
            CliError::Registry(e) => Some(e),
            CliError::Config(_)
            | CliError::ImageNotFound(_)
            | CliError::InvalidArgument(_)
            | CliError::RuntimeCreation(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<DeviceError> for CliError {
    fn from(e: DeviceError) -> Self {
        CliError::Device(e)
    }
}

impl From<ManagerError> for CliError {
    fn from(e: ManagerError) -> Self {
        CliError::Install(e)
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        CliError::Registry(e)
    }
}
