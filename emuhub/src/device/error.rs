//! Error types for device configuration.

use thiserror::Error;

/// Result type for device configuration.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors raised while building device configuration.
///
/// Building is otherwise infallible; these indicate invalid caller input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device options carry no name.
    #[error("device name is required")]
    MissingName,

    /// The device name cannot be used as a directory name.
    #[error("invalid device name '{0}': must be a single directory name")]
    InvalidName(String),

    /// No product preset with this name exists.
    #[error("unknown product preset: {0}")]
    UnknownPreset(String),
}
