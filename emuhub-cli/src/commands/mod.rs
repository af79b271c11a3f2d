//! CLI subcommands.

pub mod common;
pub mod config;
pub mod device;
pub mod images;
pub mod install;
pub mod presets;
