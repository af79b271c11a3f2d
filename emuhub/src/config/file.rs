//! The user configuration file (`config.ini`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use super::keys::ConfigKey;
use crate::device::{DeviceConfigBuilder, DeviceOptions, ScreenPreset, DEFAULT_VENDOR_COUNTRY};
use crate::manager::download::DEFAULT_TIMEOUT_SECS;
use crate::manager::ManagerConfig;
use crate::registry::Deployer;

/// Name of the application directory under the platform config directory.
pub const APP_DIR_NAME: &str = "emuhub";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Base directory for emuhub data: `~/.emuhub`.
pub fn default_base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".emuhub")
}

/// Default directory for log files.
pub fn default_log_dir() -> PathBuf {
    default_base_dir().join("logs")
}

/// Location of the configuration file.
///
/// `<platform config dir>/emuhub/config.ini`, falling back to the base
/// directory when the platform has no config directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(default_base_dir)
        .join(CONFIG_FILE_NAME)
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    /// Platform SDK installation, if known.
    pub sdk_dir: Option<PathBuf>,
    /// Root of extracted images.
    pub image_dir: PathBuf,
    /// Root of deployed devices.
    pub deployed_dir: PathBuf,
    /// Download cache.
    pub cache_dir: PathBuf,
    /// Well-known location the SDK is linked to.
    pub sdk_link: PathBuf,
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub timeout_secs: u64,
    pub keep_archive: bool,
}

/// `[device]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    pub vendor_country: String,
    pub is_public: bool,
}

/// Parsed configuration file.
///
/// Missing files and missing keys fall back to [`ConfigFile::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub paths: PathSettings,
    pub download: DownloadSettings,
    pub device: DeviceSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let base = default_base_dir();
        Self {
            paths: PathSettings {
                sdk_dir: None,
                image_dir: base.join("images"),
                deployed_dir: base.join("deployed"),
                cache_dir: base.join("cache"),
                sdk_link: base.join("sdk"),
            },
            download: DownloadSettings {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                keep_archive: false,
            },
            device: DeviceSettings {
                vendor_country: DEFAULT_VENDOR_COUNTRY.to_string(),
                is_public: true,
            },
        }
    }
}

impl ConfigFile {
    /// Load from [`config_file_path`].
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::default();

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(config);
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to an explicit path, creating parent directories.
    ///
    /// Unset optional values are not written.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }

        ini.write_to_file(path).map_err(write_err)
    }

    /// Image manager settings.
    pub fn manager_config(&self) -> ManagerConfig {
        let config = ManagerConfig::new(&self.paths.cache_dir, &self.paths.image_dir)
            .with_timeout(Duration::from_secs(self.download.timeout_secs))
            .with_keep_archive(self.download.keep_archive);

        match &self.paths.sdk_dir {
            Some(sdk_dir) => config.with_sdk_link(sdk_dir, &self.paths.sdk_link),
            None => config,
        }
    }

    /// Deployer for the configured deployed directory.
    ///
    /// Devices reference the SDK through its linked location.
    pub fn deployer(&self) -> Deployer {
        Deployer::new(DeviceConfigBuilder::new(
            &self.paths.deployed_dir,
            &self.paths.sdk_link,
        ))
    }

    /// Device options carrying the configured `[device]` defaults.
    pub fn device_options(&self, name: impl Into<String>, screen: ScreenPreset) -> DeviceOptions {
        DeviceOptions {
            vendor_country: self.device.vendor_country.clone(),
            is_public: self.device.is_public,
            ..DeviceOptions::new(name, screen)
        }
    }
}
