//! Deployment facade combining the config builder and the registry.

use std::fs;
use std::io::ErrorKind;

use tracing::info;

use super::error::{RegistryError, RegistryResult};
use super::store::DeviceRegistry;
use crate::device::{ConfigurationMapping, DeploymentRecord, DeviceConfigBuilder, DeviceOptions};
use crate::image::ImageDescriptor;

/// Deploys and undeploys devices.
#[derive(Debug, Clone)]
pub struct Deployer {
    builder: DeviceConfigBuilder,
    registry: DeviceRegistry,
}

impl Deployer {
    /// Deployer whose registry lives in the builder's deployed directory.
    pub fn new(builder: DeviceConfigBuilder) -> Self {
        let registry = DeviceRegistry::new(builder.deployed_path());
        Self { builder, registry }
    }

    pub fn builder(&self) -> &DeviceConfigBuilder {
        &self.builder
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Build the device configuration and register it.
    pub fn deploy(
        &self,
        image: &ImageDescriptor,
        options: &DeviceOptions,
    ) -> RegistryResult<DeploymentRecord> {
        let (record, mapping) = self.builder.build(image, options)?;
        self.registry.add(&record, &mapping)?;

        info!(
            name = %record.name,
            image = %image.id(),
            device_type = %record.device_type,
            "Device deployed"
        );
        Ok(record)
    }

    /// Remove a deployed device.
    pub fn undeploy(&self, name: &str) -> RegistryResult<DeploymentRecord> {
        self.registry.remove(name)
    }

    pub fn list(&self) -> RegistryResult<Vec<DeploymentRecord>> {
        self.registry.list()
    }

    pub fn is_deployed(&self, name: &str) -> RegistryResult<bool> {
        self.registry.is_deployed(name)
    }

    /// Read back the configuration file of a deployed device.
    pub fn read_config(&self, name: &str) -> RegistryResult<ConfigurationMapping> {
        let record = self
            .registry
            .get(name)?
            .ok_or_else(|| RegistryError::RecordNotFound {
                name: name.to_string(),
            })?;

        let path = record.config_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(ConfigurationMapping::parse(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(RegistryError::ResourceMissing { path })
            }
            Err(e) => Err(RegistryError::io(path, e)),
        }
    }
}
