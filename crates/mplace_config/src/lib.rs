//! Parsing and validation of `mplace.toml` run configuration files.
//!
//! This crate reads the placement run configuration and produces a
//! strongly-typed [`PlacementConfig`]: iteration budget, convergence rule,
//! snapshot cadence, net model, solver, boundary and spreading settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config, CONFIG_FILE_NAME};
pub use types::*;
