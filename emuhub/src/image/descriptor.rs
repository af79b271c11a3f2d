//! Image descriptor type.

use std::path::MAIN_SEPARATOR_STR;

use serde::{Deserialize, Serialize};

/// Description of a remote emulator system image archive.
///
/// # Example
///
/// ```
/// use emuhub::image::ImageDescriptor;
///
/// let image = ImageDescriptor {
///     path: vec!["system-image".into(), "HarmonyOS-6.0.0".into(), "pc_arm".into()],
///     os: "HarmonyOS".into(),
///     version: "6.0.0.129".into(),
///     api_level: "22".into(),
///     arch: "arm".into(),
///     device_type: "pc".into(),
///     checksum: "abc".into(),
///     url: "https://example.com/pc_arm.zip".into(),
///     size: None,
/// };
///
/// assert_eq!(image.id(), "system-image/HarmonyOS-6.0.0/pc_arm");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    /// Logical path segments of the image inside the image root.
    pub path: Vec<String>,

    /// Target operating system name.
    pub os: String,

    /// Full OS version, e.g. `6.0.0.129`.
    pub version: String,

    /// API level, e.g. `22`.
    pub api_level: String,

    /// CPU architecture (`arm`, `x86`).
    pub arch: String,

    /// Device-type tag of the image (`phone`, `pc`, ...).
    pub device_type: String,

    /// Expected SHA-256 of the archive, lowercase hex.
    pub checksum: String,

    /// Download URL of the archive.
    pub url: String,

    /// Archive size in bytes, when the catalog reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ImageDescriptor {
    /// Stable identifier: the path segments joined with `/`.
    pub fn id(&self) -> String {
        self.path.join("/")
    }

    /// Image directory relative to the image root.
    ///
    /// Segments are joined with the platform separator and a trailing
    /// separator is always present.
    pub fn image_directory(&self) -> String {
        let mut dir = self.path.join(MAIN_SEPARATOR_STR);
        dir.push_str(MAIN_SEPARATOR_STR);
        dir
    }

    /// File name of the archive in the download cache.
    pub fn archive_name(&self) -> Option<&str> {
        crate::manager::archive_file_name(&self.url)
    }
}
