//! Emulator image descriptors and catalog access.
//!
//! An [`ImageDescriptor`] identifies one downloadable system image. Descriptors
//! are produced by an [`ImageCatalog`] and are never mutated downstream.

mod catalog;
mod descriptor;

pub use catalog::{CatalogError, CatalogResult, ImageCatalog, JsonCatalog};
pub use descriptor::ImageDescriptor;
