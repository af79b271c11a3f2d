//! Link the platform SDK into its well-known location.
//!
//! The emulator expects the SDK at a fixed path. After an image is extracted
//! the installer links the configured SDK directory there, unless something
//! already exists at the link location.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ManagerError, ManagerResult};

/// Outcome of [`link_sdk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkLink {
    /// A new link was created.
    Created(PathBuf),
    /// The link location already exists and was left untouched.
    AlreadyPresent(PathBuf),
}

/// Create a link at `link_path` pointing to `sdk_path`.
///
/// The parent directory of the link is created on demand. Existing entries
/// (resolved through symlinks) are never replaced.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - Something unresolvable (e.g. a dangling symlink) occupies the location
/// - Link creation fails
pub fn link_sdk(sdk_path: &Path, link_path: &Path) -> ManagerResult<SdkLink> {
    if link_path.exists() {
        return Ok(SdkLink::AlreadyPresent(link_path.to_path_buf()));
    }

    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    create_dir_link(sdk_path, link_path).map_err(|e| ManagerError::SymlinkFailed {
        link: link_path.to_path_buf(),
        target: sdk_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    tracing::info!(
        link = %link_path.display(),
        target = %sdk_path.display(),
        "Linked SDK"
    );

    Ok(SdkLink::Created(link_path.to_path_buf()))
}

#[cfg(unix)]
fn create_dir_link(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_dir_link(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
