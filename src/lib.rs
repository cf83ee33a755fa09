//! Incline3D: directional survey processing
//!
//! Turns inclinometer surveys (measured depth, inclination, azimuth) into a
//! wellbore trajectory with dogleg intensities, positional uncertainty and
//! planned-target deviations.
//!
//! ## Architecture
//!
//! - **Units / Geometry**: typed scalars, wraparound-safe azimuth arithmetic,
//!   dogleg formulas and the five integration methods
//! - **Uncertainty**: running error accumulator for 95 % confidence half-widths
//! - **Engine**: one pure call per well, from `IntervalData` to `WellResult`
//! - **Analysis**: proximity, TVD profile and target deviation between wells
//! - **IO**: CSV / LAS / ZAK readers and writers, the JSON project file
//! - **Validation**: two-tier survey checks and an idempotent auto-fix
//!
//! The engine never logs and holds no global state; independent wells may
//! be processed in parallel by the caller.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod io;
pub mod project;
pub mod types;
pub mod uncertainty;
pub mod units;
pub mod validation;

// Re-export configuration
pub use config::{AppConfig, ConfigError};

// Re-export the engine entry points
pub use engine::{process_well, process_well_with_progress, process_well_with_targets};

// Re-export commonly used types
pub use types::{
    ActualPoint, AzimuthMode, DoglegFormula, IntervalData, MeasurementStation, Method, ProcessedPoint,
    ProcessingOptions, ProjectPoint, WellMetadata, WellResult, WellStatistics,
};
pub use units::{Degrees, Meters, OptionalAngle, Radians};

// Re-export analysis and persistence
pub use analysis::{analyze_pair, AnalysisOptions, AnalysisReport};
pub use io::{PersistenceError, TextEncoding};
pub use project::{Project, WellEntry};
pub use validation::{normalize, validate_survey, ValidationIssue, ValidationLimits, ValidationReport};
