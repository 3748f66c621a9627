//! Parsing and validation of `weft.toml` flow configuration files.
//!
//! This crate reads the flow configuration file and produces a strongly-typed
//! [`FlowConfig`]: input artifact paths, placer/router tuning, checkpoint
//! settings, and the pin-constraint table consumed by I/O placement.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
