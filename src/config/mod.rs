//! Application Configuration Module
//!
//! Operator-tunable defaults for processing, export, validation and
//! analysis, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `INCLINE3D_CONFIG` environment variable (path to TOML file)
//! 2. `incline3d.toml` in the current working directory
//! 3. Built-in defaults ([`defaults`])
//!
//! ## Usage
//!
//! There is no process-wide instance; load once and pass the pieces down:
//!
//! ```ignore
//! let config = AppConfig::load();
//! let result = engine::process_well(&survey, &config.processing);
//! ```

mod settings;
pub mod defaults;
pub mod validation;

pub use settings::*;
