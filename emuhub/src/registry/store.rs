//! File-backed registry of deployed devices.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::{RegistryError, RegistryResult};
use crate::device::{ConfigurationMapping, DeploymentRecord};

/// File name of the registry inside the deployed directory.
pub const REGISTRY_FILE_NAME: &str = "lists.json";

/// Registry of deployed devices backed by a JSON array file.
///
/// Every mutation is a plain read-modify-write of the whole file with no
/// locking. Only one writer may mutate a registry at a time; concurrent
/// `add`/`remove` calls from separate processes can lose updates.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    path: PathBuf,
}

impl DeviceRegistry {
    /// Registry stored at `<deployed_dir>/lists.json`.
    pub fn new(deployed_dir: impl AsRef<Path>) -> Self {
        Self::with_file(deployed_dir.as_ref().join(REGISTRY_FILE_NAME))
    }

    /// Registry stored at an explicit file path.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All registered records, in insertion order.
    ///
    /// An absent registry file is an empty registry.
    pub fn list(&self) -> RegistryResult<Vec<DeploymentRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => self.parse(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(RegistryError::io(&self.path, e)),
        }
    }

    /// Find a record by name.
    pub fn get(&self, name: &str) -> RegistryResult<Option<DeploymentRecord>> {
        Ok(self.list()?.into_iter().find(|record| record.name == name))
    }

    /// Register a device and write its configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateDeployment`] when a record with the
    /// same name exists or the record's target directory is already on disk.
    pub fn add(
        &self,
        record: &DeploymentRecord,
        mapping: &ConfigurationMapping,
    ) -> RegistryResult<()> {
        let mut records = self.list()?;

        if records.iter().any(|existing| existing.name == record.name)
            || record.target_dir().exists()
        {
            return Err(RegistryError::DuplicateDeployment {
                name: record.name.clone(),
            });
        }

        records.push(record.clone());
        self.write(&records)?;

        let target = record.target_dir();
        if let Err(e) = Self::write_device_dir(record, mapping) {
            records.pop();
            self.rollback(target, &records);
            return Err(e);
        }

        info!(
            name = %record.name,
            path = %target.display(),
            "Device registered"
        );
        Ok(())
    }

    /// Unregister a device and delete its target directory.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ResourceMissing`] when the registry file is
    /// absent and [`RegistryError::RecordNotFound`] when no record has this
    /// name.
    pub fn remove(&self, name: &str) -> RegistryResult<DeploymentRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RegistryError::ResourceMissing {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(RegistryError::io(&self.path, e)),
        };

        let mut records = self.parse(&content)?;
        let index = records
            .iter()
            .position(|record| record.name == name)
            .ok_or_else(|| RegistryError::RecordNotFound {
                name: name.to_string(),
            })?;

        let removed = records.remove(index);
        self.write(&records)?;

        let target = removed.target_dir();
        match fs::remove_dir_all(target) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %target.display(), "Device directory already gone");
            }
            Err(e) => return Err(RegistryError::io(target, e)),
        }

        info!(name = %removed.name, "Device removed");
        Ok(removed)
    }

    /// Whether a device is registered and its configuration file exists.
    pub fn is_deployed(&self, name: &str) -> RegistryResult<bool> {
        Ok(self
            .get(name)?
            .is_some_and(|record| record.config_path().is_file()))
    }

    fn write_device_dir(
        record: &DeploymentRecord,
        mapping: &ConfigurationMapping,
    ) -> RegistryResult<()> {
        let target = record.target_dir();
        fs::create_dir_all(target).map_err(|e| RegistryError::io(target, e))?;

        let config_path = record.config_path();
        fs::write(&config_path, mapping.to_text())
            .map_err(|e| RegistryError::io(&config_path, e))
    }

    /// Undo a partially applied `add`: restore the previous records and drop
    /// the device directory created for the new one.
    fn rollback(&self, target: &Path, records: &[DeploymentRecord]) {
        if let Err(e) = self.write(records) {
            warn!(path = %self.path.display(), error = %e, "Failed to restore registry");
        }
        if target.is_dir() {
            if let Err(e) = fs::remove_dir_all(target) {
                warn!(path = %target.display(), error = %e, "Failed to remove device directory");
            }
        }
    }

    fn parse(&self, content: &str) -> RegistryResult<Vec<DeploymentRecord>> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| self.corrupt(e.to_string()))?;

        if !value.is_array() {
            return Err(self.corrupt("expected a JSON array".to_string()));
        }

        serde_json::from_value(value).map_err(|e| self.corrupt(e.to_string()))
    }

    fn write(&self, records: &[DeploymentRecord]) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json).map_err(|e| RegistryError::io(&self.path, e))
    }

    fn corrupt(&self, reason: String) -> RegistryError {
        RegistryError::RegistryCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}
