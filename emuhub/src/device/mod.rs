//! Device configuration.
//!
//! Turns an [`ImageDescriptor`](crate::image::ImageDescriptor), a set of
//! [`DeviceOptions`] and a [`ScreenPreset`] into a [`DeploymentRecord`] and
//! the [`ConfigurationMapping`] written to the device's `config.ini`.
//!
//! # Example
//!
//! ```
//! use emuhub::device::{screen_preset, DeviceConfigBuilder, DeviceOptions};
//! use emuhub::image::ImageDescriptor;
//!
//! let image = ImageDescriptor {
//!     path: vec!["system-image".into(), "pc_arm".into()],
//!     os: "HarmonyOS".into(),
//!     version: "6.0.0.129".into(),
//!     api_level: "22".into(),
//!     arch: "arm".into(),
//!     device_type: "pc".into(),
//!     checksum: String::new(),
//!     url: "https://example.com/pc_arm.zip".into(),
//!     size: None,
//! };
//! let options = DeviceOptions::new("Fold", screen_preset("Foldable PC").unwrap());
//!
//! let builder = DeviceConfigBuilder::new("/tmp/deployed", "/tmp/sdk");
//! let (record, mapping) = builder.build(&image, &options).unwrap();
//!
//! assert_eq!(record.device_type, "2in1_foldable");
//! assert_eq!(mapping.get("hw.lcd.number"), Some("2"));
//! ```

mod builder;
mod error;
mod mapping;
mod options;
mod presets;
mod record;
mod screen;

pub use builder::DeviceConfigBuilder;
pub use error::{DeviceError, DeviceResult};
pub use mapping::ConfigurationMapping;
pub use options::{
    DeviceOptions, DEFAULT_CPU_NUMBER, DEFAULT_DATA_DISK_SIZE, DEFAULT_MEMORY_RAM_SIZE,
    DEFAULT_VENDOR_COUNTRY,
};
pub use presets::{find_preset, presets, presets_for_device_type, screen_preset};
pub use record::{DeploymentRecord, CONFIG_FILE_NAME};
pub use screen::{
    DualScreen, OuterScreen, ProductPreset, ScreenDimensions, ScreenPreset, ScreenSize,
    FOLDABLE_2IN1,
};
