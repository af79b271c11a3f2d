//! Typed `section.key` access to configuration values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::{ConfigError, ConfigResult};
use super::file::ConfigFile;

/// A configuration setting addressable as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    PathsSdkDir,
    PathsImageDir,
    PathsDeployedDir,
    PathsCacheDir,
    PathsSdkLink,
    DownloadTimeoutSecs,
    DownloadKeepArchive,
    DeviceVendorCountry,
    DeviceIsPublic,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::PathsSdkDir,
            ConfigKey::PathsImageDir,
            ConfigKey::PathsDeployedDir,
            ConfigKey::PathsCacheDir,
            ConfigKey::PathsSdkLink,
            ConfigKey::DownloadTimeoutSecs,
            ConfigKey::DownloadKeepArchive,
            ConfigKey::DeviceVendorCountry,
            ConfigKey::DeviceIsPublic,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::PathsSdkDir
            | ConfigKey::PathsImageDir
            | ConfigKey::PathsDeployedDir
            | ConfigKey::PathsCacheDir
            | ConfigKey::PathsSdkLink => "paths",
            ConfigKey::DownloadTimeoutSecs | ConfigKey::DownloadKeepArchive => "download",
            ConfigKey::DeviceVendorCountry | ConfigKey::DeviceIsPublic => "device",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::PathsSdkDir => "sdk_dir",
            ConfigKey::PathsImageDir => "image_dir",
            ConfigKey::PathsDeployedDir => "deployed_dir",
            ConfigKey::PathsCacheDir => "cache_dir",
            ConfigKey::PathsSdkLink => "sdk_link",
            ConfigKey::DownloadTimeoutSecs => "timeout_secs",
            ConfigKey::DownloadKeepArchive => "keep_archive",
            ConfigKey::DeviceVendorCountry => "vendor_country",
            ConfigKey::DeviceIsPublic => "is_public",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let paths = &config.paths;
        match self {
            ConfigKey::PathsSdkDir => paths
                .sdk_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::PathsImageDir => paths.image_dir.display().to_string(),
            ConfigKey::PathsDeployedDir => paths.deployed_dir.display().to_string(),
            ConfigKey::PathsCacheDir => paths.cache_dir.display().to_string(),
            ConfigKey::PathsSdkLink => paths.sdk_link.display().to_string(),
            ConfigKey::DownloadTimeoutSecs => config.download.timeout_secs.to_string(),
            ConfigKey::DownloadKeepArchive => config.download.keep_archive.to_string(),
            ConfigKey::DeviceVendorCountry => config.device.vendor_country.clone(),
            ConfigKey::DeviceIsPublic => config.device.is_public.to_string(),
        }
    }

    /// Validate and store a value.
    ///
    /// An empty `paths.sdk_dir` clears it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        match self {
            ConfigKey::PathsSdkDir => {
                config.paths.sdk_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ConfigKey::PathsImageDir => config.paths.image_dir = self.parse_path(value)?,
            ConfigKey::PathsDeployedDir => config.paths.deployed_dir = self.parse_path(value)?,
            ConfigKey::PathsCacheDir => config.paths.cache_dir = self.parse_path(value)?,
            ConfigKey::PathsSdkLink => config.paths.sdk_link = self.parse_path(value)?,
            ConfigKey::DownloadTimeoutSecs => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| self.invalid(value, "expected seconds"))?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be greater than zero"));
                }
                config.download.timeout_secs = secs;
            }
            ConfigKey::DownloadKeepArchive => {
                config.download.keep_archive = self.parse_bool(value)?
            }
            ConfigKey::DeviceVendorCountry => {
                if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(self.invalid(value, "expected a country code"));
                }
                config.device.vendor_country = value.to_ascii_uppercase();
            }
            ConfigKey::DeviceIsPublic => config.device.is_public = self.parse_bool(value)?,
        }
        Ok(())
    }

    fn parse_path(&self, value: &str) -> ConfigResult<PathBuf> {
        if value.is_empty() {
            return Err(self.invalid(value, "path must not be empty"));
        }
        Ok(PathBuf::from(value))
    }

    fn parse_bool(&self, value: &str) -> ConfigResult<bool> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}
