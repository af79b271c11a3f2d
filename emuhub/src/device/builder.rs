//! Derivation of deployment records and configuration mappings.
//!
//! Both operations are pure: the same image and options always produce the
//! same record and the same mapping, field order included. The only
//! non-deterministic input, the device UUID, is fixed when the
//! [`DeviceOptions`] are constructed.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::error::{DeviceError, DeviceResult};
use super::mapping::ConfigurationMapping;
use super::options::DeviceOptions;
use super::record::DeploymentRecord;
use super::screen::ScreenSize;
use crate::image::ImageDescriptor;
use crate::registry::REGISTRY_FILE_NAME;

/// Builds device records and mappings against fixed base paths.
#[derive(Debug, Clone)]
pub struct DeviceConfigBuilder {
    deployed_path: PathBuf,
    sdk_path: PathBuf,
}

impl DeviceConfigBuilder {
    /// Create a builder.
    ///
    /// # Arguments
    ///
    /// * `deployed_path` - Base directory holding one directory per device
    /// * `sdk_path` - Platform SDK location written into every mapping
    pub fn new(deployed_path: impl Into<PathBuf>, sdk_path: impl Into<PathBuf>) -> Self {
        Self {
            deployed_path: deployed_path.into(),
            sdk_path: sdk_path.into(),
        }
    }

    pub fn deployed_path(&self) -> &Path {
        &self.deployed_path
    }

    pub fn sdk_path(&self) -> &Path {
        &self.sdk_path
    }

    /// Target directory of a device with the given name.
    pub fn target_dir(&self, name: &str) -> PathBuf {
        self.deployed_path.join(name)
    }

    /// Derive the deployment record for an image and device options.
    ///
    /// Product presets override the image's device type and contribute
    /// `dev_model` and `model`; raw screens never do.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::MissingName`] when the options carry an empty
    /// name and [`DeviceError::InvalidName`] when the name is not a plain
    /// directory name inside the deployed directory.
    pub fn build_record(
        &self,
        image: &ImageDescriptor,
        options: &DeviceOptions,
    ) -> DeviceResult<DeploymentRecord> {
        validate_name(&options.name)?;

        let screen = options.screen.screen();
        let product = options.screen.product();
        let device_type = product
            .map(|preset| preset.device_type.clone())
            .unwrap_or_else(|| image.device_type.clone());

        Ok(DeploymentRecord {
            name: options.name.clone(),
            uuid: options.uuid.clone(),
            device_type,
            os: image.os.clone(),
            version: image.version.clone(),
            api_version: image.api_level.clone(),
            arch: image.arch.clone(),
            cpu_number: options.cpu_number.to_string(),
            memory_ram_size: options.memory_ram_size.to_string(),
            data_disk_size: options.data_disk_size.to_string(),
            resolution_width: screen.width.to_string(),
            resolution_height: screen.height.to_string(),
            density: screen.density.to_string(),
            diagonal_size: format!("{:.2}", screen.diagonal),
            image_dir: image.image_directory(),
            path: self.target_dir(&options.name),
            sdk_path: self.sdk_path.clone(),
            vendor_country: options.vendor_country.clone(),
            is_public: options.is_public,
            hdc_port: options.hdc_port.map(|port| port.to_string()),
            dev_model: product.and_then(|preset| preset.dev_model.clone()),
            model: product.and_then(|preset| preset.display_name.clone()),
        })
    }

    /// Derive the configuration mapping of a record.
    ///
    /// Dual-screen mode puts the outer panel in the `single` fields and the
    /// primary panel in the `double` fields. Otherwise the primary panel goes
    /// in `single`, and a product's partial outer panel is written to the
    /// `phy` fields. Overrides from the options are applied last.
    pub fn build_mapping(
        &self,
        record: &DeploymentRecord,
        options: &DeviceOptions,
    ) -> ConfigurationMapping {
        let mut mapping = ConfigurationMapping::new();

        mapping.set("name", &record.name);
        mapping.set("deviceType", &record.device_type);
        mapping.set("uuid", &record.uuid);
        mapping.set("hw.apiName", &record.api_version);
        mapping.set("guestVersion", &record.version);
        mapping.set("hw.cpu.arch", &record.arch);
        mapping.set("hw.cpu.ncore", &record.cpu_number);
        mapping.set("hw.ramSize", &record.memory_ram_size);
        mapping.set("hw.dataPartitionSize", &record.data_disk_size);
        mapping.set("hw.lcd.density", &record.density);

        let screen = options.screen.screen();
        match options.screen.dual_screen(&record.device_type) {
            Some(dual) => {
                debug!(name = %record.name, "Dual-screen configuration selected");
                mapping.set("hw.lcd.number", "2");
                insert_size(&mut mapping, "hw.lcd.single", &dual.folded);
                insert_size(&mut mapping, "hw.lcd.double", &dual.unfolded);
            }
            None => {
                mapping.set("hw.lcd.number", "1");
                insert_size(&mut mapping, "hw.lcd.single", &screen.size());

                if let Some(outer) = options.screen.outer().filter(|outer| outer.has_any()) {
                    mapping.insert("hw.lcd.phy.diagonalSize", outer.diagonal.map(format_diagonal));
                    mapping.insert("hw.lcd.phy.height", outer.height.map(|h| h.to_string()));
                    mapping.insert("hw.lcd.phy.width", outer.width.map(|w| w.to_string()));
                }
            }
        }

        mapping.set("imageSubPath", &record.image_dir);
        mapping.set("instancePath", record.path.to_string_lossy());
        mapping.set("harmonyos.sdk.path", record.sdk_path.to_string_lossy());
        mapping.insert("productModel", record.model.clone());
        mapping.insert("devModel", record.dev_model.clone());
        mapping.set("isPublic", record.is_public.to_string());
        mapping.set("vendorCountry", &record.vendor_country);
        mapping.insert("hw.hdc.port", record.hdc_port.clone());

        for (key, value) in &options.overrides {
            mapping.set(key.as_str(), value.as_str());
        }

        mapping
    }

    /// Build both the record and its mapping.
    pub fn build(
        &self,
        image: &ImageDescriptor,
        options: &DeviceOptions,
    ) -> DeviceResult<(DeploymentRecord, ConfigurationMapping)> {
        let record = self.build_record(image, options)?;
        let mapping = self.build_mapping(&record, options);
        Ok((record, mapping))
    }
}

fn insert_size(mapping: &mut ConfigurationMapping, prefix: &str, size: &ScreenSize) {
    mapping.set(format!("{prefix}.diagonalSize"), format_diagonal(size.diagonal));
    mapping.set(format!("{prefix}.height"), size.height.to_string());
    mapping.set(format!("{prefix}.width"), size.width.to_string());
}

/// Shortest decimal form: `18.0` becomes `18`, `6.5` stays `6.5`.
fn format_diagonal(diagonal: f64) -> String {
    diagonal.to_string()
}

/// A device name must be exactly one normal path component and must not
/// shadow the registry file.
fn validate_name(name: &str) -> DeviceResult<()> {
    if name.trim().is_empty() {
        return Err(DeviceError::MissingName);
    }

    let mut components = Path::new(name).components();
    let single = match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part.to_str() == Some(name),
        _ => false,
    };

    if !single || name == REGISTRY_FILE_NAME {
        return Err(DeviceError::InvalidName(name.to_string()));
    }
    Ok(())
}
