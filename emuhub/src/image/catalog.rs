//! Image catalog interface.
//!
//! Listing the remote catalog over HTTP is handled elsewhere; this module only
//! defines the narrow interface the pipeline consumes, plus a catalog backed by
//! a locally cached JSON listing.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ImageDescriptor;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while reading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog listing could not be read.
    #[error("failed to read catalog {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog listing is not a valid descriptor array.
    #[error("failed to parse catalog {}: {reason}", .path.display())]
    ParseFailed { path: PathBuf, reason: String },
}

/// Source of available image descriptors.
pub trait ImageCatalog {
    /// List every image the catalog knows about.
    fn images(&self) -> CatalogResult<Vec<ImageDescriptor>>;

    /// Find an image by its [`ImageDescriptor::id`].
    fn find(&self, id: &str) -> CatalogResult<Option<ImageDescriptor>> {
        Ok(self.images()?.into_iter().find(|image| image.id() == id))
    }
}

/// Catalog backed by a JSON array of descriptors on disk.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    /// Create a catalog reading from the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageCatalog for JsonCatalog {
    fn images(&self) -> CatalogResult<Vec<ImageDescriptor>> {
        let content = fs::read_to_string(&self.path).map_err(|e| CatalogError::ReadFailed {
            path: self.path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| CatalogError::ParseFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}
