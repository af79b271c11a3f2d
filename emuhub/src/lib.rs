//! Emuhub - emulator image and device deployment management.
//!
//! This library provides the building blocks used by the `emuhub` CLI:
//!
//! - [`manager`]: resumable download, SHA-256 verification and zip extraction
//!   of emulator image archives
//! - [`device`]: derivation of deployment records and flat `config.ini`
//!   mappings from an image, device sizing options and a screen preset
//! - [`registry`]: the file-backed registry of deployed devices
//! - [`image`]: image descriptors and the catalog interface
//! - [`config`]: the user configuration file
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod device;
pub mod image;
pub mod logging;
pub mod manager;
pub mod registry;
