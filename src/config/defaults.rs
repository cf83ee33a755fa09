//! System-wide default constants.
//!
//! Centralises the numeric constants of the trajectory engine, the error
//! model and the file formats. Grouped by subsystem for easy discovery.

// ============================================================================
// Processing
// ============================================================================

/// Long-scale intensity interval (m).
pub const INTENSITY_INTERVAL_M: f64 = 25.0;

/// Short-scale intensity interval (m). Intensities are reported in °/10 m.
pub const SHORT_INTENSITY_INTERVAL_M: f64 = 10.0;

/// Inclination at or below which a station counts as vertical (°).
pub const CRITICAL_INCLINATION_DEG: f64 = 0.5;

/// Depth of the near-surface zone when no conductor shoe is recorded (m).
pub const NEAR_SURFACE_DEPTH_M: f64 = 30.0;

/// Half-width of the intensity smoothing window (m).
pub const SMOOTHING_WINDOW_M: f64 = 10.0;

/// Interval lengths below this are treated as zero-length (m).
pub const ZERO_INTERVAL_M: f64 = 1e-9;

/// Dogleg below which the minimum-curvature ratio factor is taken as 1 (rad).
pub const RATIO_FACTOR_EPSILON: f64 = 1e-7;

// ============================================================================
// Error Model
// ============================================================================

/// Divisor applied to the north/east variance contributions.
///
/// Empirical tuning factor with no published derivation; reproduced as-is.
pub const EMPIRICAL_XY_VARIANCE_DIVISOR: f64 = 2.0;

/// Two-sided 95 % quantile of the standard normal distribution.
pub const CONFIDENCE_95: f64 = 1.96;

/// One-sigma depth measurement error per interval (m).
pub const DEPTH_ERROR_M: f64 = 0.1;

/// One-sigma inclination error of a typical survey instrument (°).
pub const INCLINATION_ERROR_DEG: f64 = 0.1;

/// One-sigma azimuth error of a typical survey instrument (°).
pub const AZIMUTH_ERROR_DEG: f64 = 1.0;

/// Interval length below which intensity uncertainty is reported as zero (m).
pub const MIN_INTERVAL_FOR_INTENSITY_SIGMA_M: f64 = 1e-6;

// ============================================================================
// Validation
// ============================================================================

/// Shallowest plausible station depth (m).
pub const MIN_PLAUSIBLE_DEPTH_M: f64 = -1_000.0;

/// Deepest plausible station depth (m).
pub const MAX_PLAUSIBLE_DEPTH_M: f64 = 15_000.0;

/// Depth difference below which two stations count as duplicates (m).
pub const DUPLICATE_DEPTH_EPSILON_M: f64 = 1e-6;

/// Station spacing above which a coverage warning is raised (m).
pub const MAX_STATION_GAP_M: f64 = 100.0;

// ============================================================================
// File Formats
// ============================================================================

/// LAS 2.0 default null value.
pub const LAS_NULL_VALUE: f64 = -999.25;

/// Tolerance when comparing against the LAS null value.
pub const LAS_NULL_EPSILON: f64 = 1e-6;

/// Number of leading non-empty lines sampled by delimiter detection.
pub const DETECTION_SAMPLE_LINES: usize = 50;

/// Project document format tag.
pub const PROJECT_FORMAT_ID: &str = "incline3d-project";

/// Project document schema version written on save.
pub const PROJECT_FORMAT_VERSION: &str = "1.0.0";

/// Default decimal places for tabular export.
pub const EXPORT_PRECISION: usize = 2;

// ============================================================================
// Analysis
// ============================================================================

/// |ΔTVD| tolerance for horizontal proximity (m).
pub const HORIZONTAL_TVD_TOLERANCE_M: f64 = 5.0;

/// TVD step of the proximity profile (m).
pub const PROFILE_STEP_M: f64 = 10.0;

/// Upper bound on TVD profile rows; a finer step is widened to fit.
pub const MAX_PROFILE_ROWS: usize = 100_000;
