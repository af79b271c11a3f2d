//! Error types for the device registry.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::device::DeviceError;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised by the device registry and deployer.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A device with this name is already registered, or its directory exists.
    #[error("device '{name}' is already deployed")]
    DuplicateDeployment { name: String },

    /// The registry file does not hold a JSON array of records.
    #[error("registry file {} is corrupt: {reason}", .path.display())]
    RegistryCorrupt { path: PathBuf, reason: String },

    /// No record with this name exists.
    #[error("device '{name}' not found")]
    RecordNotFound { name: String },

    /// An expected file or directory is absent.
    #[error("{} does not exist", .path.display())]
    ResourceMissing { path: PathBuf },

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Records could not be serialized.
    #[error("failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid device input.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
