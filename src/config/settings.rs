//! Application configuration - processing, export, validation and analysis
//! knobs as operator-tunable TOML values.
//!
//! Every section implements `Default` with the values in [`super::defaults`],
//! so a missing file or a sparse file behaves exactly like the built-ins.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::validation::{validate_physical_ranges, validate_unknown_keys};
use crate::analysis::AnalysisOptions;
use crate::io::ExportOptions;
use crate::types::ProcessingOptions;
use crate::validation::ValidationLimits;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "INCLINE3D_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "incline3d.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `AppConfig::load()` which searches:
/// 1. `$INCLINE3D_CONFIG` env var
/// 2. `./incline3d.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Engine options used for every run
    #[serde(default)]
    pub processing: ProcessingOptions,

    /// Tabular writers
    #[serde(default)]
    pub export: ExportOptions,

    /// Survey validation limits
    #[serde(default)]
    pub validation: ValidationLimits,

    /// Well-pair analysis
    #[serde(default)]
    pub analysis: AnalysisOptions,
}

impl AppConfig {
    /// Load configuration using the standard search order:
    /// 1. `$INCLINE3D_CONFIG` environment variable
    /// 2. `./incline3d.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), method = %config.processing.method, "Loaded config from INCLINE3D_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from INCLINE3D_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "INCLINE3D_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./incline3d.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(method = %config.processing.method, "Loaded config from ./incline3d.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./incline3d.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No incline3d.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse TOML text. Unknown keys are logged as warnings, never rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Reject impossible values; suspicious ones are logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = validate_physical_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Method;
    use crate::units::Meters;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[processing]"));
        let back = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_sparse_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
[processing]
method = "average_angle"

[processing.error_model]
confidence_factor = 2.0

[export]
delimiter = ","
"#,
        )
        .unwrap();
        assert_eq!(config.processing.method, Method::AverageAngle);
        assert_eq!(config.processing.error_model.confidence_factor, 2.0);
        assert_eq!(config.processing.intensity_interval, Meters(25.0));
        assert_eq!(config.export.delimiter, ',');
        assert_eq!(config.export.precision, 2);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AppConfig::from_toml_str("[processing]\nintensity_interval = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("intensity_interval"));
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let err = AppConfig::load_from_file(Path::new("/nonexistent/incline3d.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incline3d.toml");
        let mut config = AppConfig::default();
        config.processing.smooth_intensity = true;
        config.save_to_file(&path).unwrap();
        assert_eq!(AppConfig::load_from_file(&path).unwrap(), config);
    }
}
