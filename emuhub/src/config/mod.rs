//! User configuration.
//!
//! Settings live in an INI file at [`config_file_path`]:
//!
//! ```ini
//! [paths]
//! sdk_dir = /opt/emulator-sdk
//! image_dir = ~/.emuhub/images
//! deployed_dir = ~/.emuhub/deployed
//! cache_dir = ~/.emuhub/cache
//! sdk_link = ~/.emuhub/sdk
//!
//! [download]
//! timeout_secs = 300
//! keep_archive = false
//!
//! [device]
//! vendor_country = CN
//! is_public = true
//! ```

mod error;
mod file;
mod keys;

pub use error::{ConfigError, ConfigResult};
pub use file::{
    config_file_path, default_base_dir, default_log_dir, ConfigFile, DeviceSettings,
    DownloadSettings, PathSettings,
};
pub use keys::ConfigKey;
