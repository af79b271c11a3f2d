//! Device sizing options.

use indexmap::IndexMap;

use super::screen::ScreenPreset;

/// Default number of virtual CPUs.
pub const DEFAULT_CPU_NUMBER: u32 = 4;

/// Default RAM size in MB.
pub const DEFAULT_MEMORY_RAM_SIZE: u64 = 4096;

/// Default data disk size in MB.
pub const DEFAULT_DATA_DISK_SIZE: u64 = 6144;

/// Default vendor country code.
pub const DEFAULT_VENDOR_COUNTRY: &str = "CN";

/// Options describing one device to deploy.
///
/// Construct once with [`DeviceOptions::new`] and adjust fields with struct
/// update syntax; the builder never mutates options.
///
/// # Example
///
/// ```
/// use emuhub::device::{DeviceOptions, ScreenDimensions, ScreenPreset};
///
/// let screen = ScreenPreset::Raw(ScreenDimensions {
///     diagonal: 6.5,
///     density: 480,
///     height: 2400,
///     width: 1080,
/// });
/// let options = DeviceOptions {
///     cpu_number: 8,
///     ..DeviceOptions::new("Pixel", screen)
/// };
///
/// assert_eq!(options.cpu_number, 8);
/// assert_eq!(options.vendor_country, "CN");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceOptions {
    /// Unique device name.
    pub name: String,
    /// Device UUID, assigned once at construction.
    pub uuid: String,
    /// Number of virtual CPUs.
    pub cpu_number: u32,
    /// RAM size in MB.
    pub memory_ram_size: u64,
    /// Data disk size in MB.
    pub data_disk_size: u64,
    /// Screen configuration.
    pub screen: ScreenPreset,
    /// Vendor country code.
    pub vendor_country: String,
    /// Whether the device is a public (non-customised) device.
    pub is_public: bool,
    /// Fixed debugging bridge port, `None` to let the emulator choose.
    pub hdc_port: Option<u16>,
    /// Configuration entries applied after every derived field.
    pub overrides: IndexMap<String, String>,
}

impl DeviceOptions {
    /// Create options with explicit defaults and a fresh UUID.
    pub fn new(name: impl Into<String>, screen: ScreenPreset) -> Self {
        Self {
            name: name.into(),
            uuid: uuid::Uuid::new_v4().to_string(),
            cpu_number: DEFAULT_CPU_NUMBER,
            memory_ram_size: DEFAULT_MEMORY_RAM_SIZE,
            data_disk_size: DEFAULT_DATA_DISK_SIZE,
            screen,
            vendor_country: DEFAULT_VENDOR_COUNTRY.to_string(),
            is_public: true,
            hdc_port: None,
            overrides: IndexMap::new(),
        }
    }
}
