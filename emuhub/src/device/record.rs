//! Deployment record persisted in the device registry.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the per-device configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Fully resolved descriptor of one deployed device.
///
/// Numeric sizing fields are stored as strings, the way the emulator
/// tooling reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub name: String,
    pub uuid: String,
    pub device_type: String,
    pub os: String,
    pub version: String,
    pub api_version: String,
    pub arch: String,
    pub cpu_number: String,
    pub memory_ram_size: String,
    pub data_disk_size: String,
    pub resolution_width: String,
    pub resolution_height: String,
    pub density: String,
    /// Diagonal size with two decimal places.
    pub diagonal_size: String,
    /// Image directory relative to the image root, with trailing separator.
    pub image_dir: String,
    /// Target directory of the deployed device.
    pub path: PathBuf,
    pub sdk_path: PathBuf,
    pub vendor_country: String,
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdc_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DeploymentRecord {
    /// Target directory of the device.
    pub fn target_dir(&self) -> &Path {
        &self.path
    }

    /// Path of the device configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE_NAME)
    }
}
