//! Processing options consumed once per engine run.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::units::{Degrees, Meters};

/// Trajectory integration method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    AverageAngle,
    BalancedTangential,
    #[default]
    MinimumCurvature,
    /// Integrates exactly like `MinimumCurvature` until a distinct integral
    /// rule is defined; kept as a separate enumerant for project files.
    MinimumCurvatureIntegral,
    RingArc,
}

impl Method {
    pub const ALL: [Self; 5] = [
        Self::AverageAngle,
        Self::BalancedTangential,
        Self::MinimumCurvature,
        Self::MinimumCurvatureIntegral,
        Self::RingArc,
    ];

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Method::AverageAngle => "Average Angle",
            Method::BalancedTangential => "Balanced Tangential",
            Method::MinimumCurvature => "Minimum Curvature",
            Method::MinimumCurvatureIntegral => "Minimum Curvature (Integral)",
            Method::RingArc => "Ring Arc",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which azimuth reading feeds the working azimuth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AzimuthMode {
    /// Magnetic reading plus declination.
    Magnetic,
    /// True reading only.
    True,
    /// True if present, else magnetic plus declination.
    #[default]
    Auto,
}

/// Dogleg formula used for intensities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DoglegFormula {
    #[default]
    Cosine,
    Sine,
}

/// Thresholds deciding when a station is treated as vertical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VerticalityOptions {
    #[serde(default = "default_critical_inclination")]
    pub critical_inclination: Degrees,

    /// Used when the survey records no conductor-shoe depth.
    #[serde(default = "default_near_surface_depth")]
    pub near_surface_depth: Meters,
}

fn default_critical_inclination() -> Degrees {
    Degrees(defaults::CRITICAL_INCLINATION_DEG)
}
fn default_near_surface_depth() -> Meters {
    Meters(defaults::NEAR_SURFACE_DEPTH_M)
}

impl Default for VerticalityOptions {
    fn default() -> Self {
        Self {
            critical_inclination: default_critical_inclination(),
            near_surface_depth: default_near_surface_depth(),
        }
    }
}

/// Constants of the positional error model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ErrorModel {
    /// Divisor on the north/east variance terms (empirical).
    #[serde(default = "default_xy_divisor")]
    pub xy_divisor: f64,

    /// Multiplier converting one sigma to the reported confidence level.
    #[serde(default = "default_confidence_factor")]
    pub confidence_factor: f64,

    /// One-sigma depth error per interval.
    #[serde(default = "default_depth_error")]
    pub depth_error: Meters,
}

fn default_xy_divisor() -> f64 {
    defaults::EMPIRICAL_XY_VARIANCE_DIVISOR
}
fn default_confidence_factor() -> f64 {
    defaults::CONFIDENCE_95
}
fn default_depth_error() -> Meters {
    Meters(defaults::DEPTH_ERROR_M)
}

impl Default for ErrorModel {
    fn default() -> Self {
        Self {
            xy_divisor: default_xy_divisor(),
            confidence_factor: default_confidence_factor(),
            depth_error: default_depth_error(),
        }
    }
}

/// Per-run engine configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProcessingOptions {
    #[serde(default)]
    pub method: Method,

    #[serde(default)]
    pub azimuth_mode: AzimuthMode,

    #[serde(default)]
    pub dogleg_formula: DoglegFormula,

    /// Interval of the long-scale intensity.
    #[serde(default = "default_intensity_interval")]
    pub intensity_interval: Meters,

    #[serde(default)]
    pub verticality: VerticalityOptions,

    #[serde(default = "default_true")]
    pub calculate_errors: bool,

    #[serde(default)]
    pub error_model: ErrorModel,

    #[serde(default)]
    pub smooth_intensity: bool,

    /// Half-width of the depth window used by intensity smoothing.
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: Meters,

    #[serde(default = "default_true")]
    pub interpolate_missing_azimuths: bool,

    #[serde(default)]
    pub extend_last_azimuth: bool,

    #[serde(default)]
    pub blank_vertical_azimuth: bool,

    #[serde(default = "default_true")]
    pub vertical_if_no_azimuth: bool,
}

fn default_true() -> bool {
    true
}
fn default_intensity_interval() -> Meters {
    Meters(defaults::INTENSITY_INTERVAL_M)
}
fn default_smoothing_window() -> Meters {
    Meters(defaults::SMOOTHING_WINDOW_M)
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            method: Method::default(),
            azimuth_mode: AzimuthMode::default(),
            dogleg_formula: DoglegFormula::default(),
            intensity_interval: default_intensity_interval(),
            verticality: VerticalityOptions::default(),
            calculate_errors: true,
            error_model: ErrorModel::default(),
            smooth_intensity: false,
            smoothing_window: default_smoothing_window(),
            interpolate_missing_azimuths: true,
            extend_last_azimuth: false,
            blank_vertical_azimuth: false,
            vertical_if_no_azimuth: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_encodings_are_snake_case() {
        assert_eq!(serde_json::to_string(&Method::MinimumCurvature).unwrap(), "\"minimum_curvature\"");
        assert_eq!(
            serde_json::to_string(&Method::MinimumCurvatureIntegral).unwrap(),
            "\"minimum_curvature_integral\""
        );
        assert_eq!(serde_json::to_string(&AzimuthMode::Auto).unwrap(), "\"auto\"");
        assert_eq!(serde_json::to_string(&AzimuthMode::True).unwrap(), "\"true\"");
        assert_eq!(serde_json::to_string(&DoglegFormula::Sine).unwrap(), "\"sine\"");
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let opts: ProcessingOptions = serde_json::from_str(r#"{"method":"ring_arc"}"#).unwrap();
        assert_eq!(opts.method, Method::RingArc);
        assert_eq!(opts.intensity_interval, Meters(25.0));
        assert_eq!(opts.verticality.critical_inclination, Degrees(0.5));
        assert!(opts.calculate_errors);
        assert_eq!(opts.error_model.confidence_factor, 1.96);
    }
}
