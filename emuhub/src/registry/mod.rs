//! Registry of deployed devices.
//!
//! [`DeviceRegistry`] persists [`DeploymentRecord`](crate::device::DeploymentRecord)s
//! as a JSON array in `<deployed>/lists.json` and owns each device's target
//! directory. [`Deployer`] ties it to the
//! [`DeviceConfigBuilder`](crate::device::DeviceConfigBuilder).

mod deployer;
mod error;
mod store;

pub use deployer::Deployer;
pub use error::{RegistryError, RegistryResult};
pub use store::{DeviceRegistry, REGISTRY_FILE_NAME};
