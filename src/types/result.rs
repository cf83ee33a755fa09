//! Engine output: processed points, statistics and the well result.

use serde::{Deserialize, Serialize};

use super::{ProcessingOptions, ProjectPoint, WellMetadata};
use crate::units::{Degrees, Meters, OptionalAngle};

/// One fully-resolved trajectory station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProcessedPoint {
    pub depth: Meters,
    pub inclination: Degrees,
    pub magnetic_azimuth: OptionalAngle,
    pub true_azimuth: OptionalAngle,
    /// Working azimuth actually used after reconstruction.
    pub computed_azimuth: OptionalAngle,
    #[serde(default)]
    pub tool_face: OptionalAngle,
    #[serde(default)]
    pub rop: Option<f64>,
    #[serde(default)]
    pub marker: Option<String>,

    /// North.
    pub x: Meters,
    /// East.
    pub y: Meters,
    pub tvd: Meters,
    pub absolute_altitude: Meters,
    pub shift: Meters,
    pub direction_angle: Degrees,
    /// MD − TVD.
    pub elongation: Meters,

    /// Dogleg intensity, °/10 m.
    pub intensity_10m: f64,
    /// Dogleg intensity over the long interval, °/L m.
    pub intensity_l: f64,

    // 95 % confidence half-widths
    pub sigma_x: Meters,
    pub sigma_y: Meters,
    pub sigma_tvd: Meters,
    pub sigma_intensity: f64,
}

/// Summary values derived from the processed points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WellStatistics {
    pub max_inclination: Degrees,
    pub max_inclination_depth: Meters,
    pub max_intensity_10m: f64,
    pub max_intensity_10m_depth: Meters,
    pub max_intensity_l: f64,
    pub max_intensity_l_depth: Meters,
    pub final_shift: Meters,
    pub final_direction: Degrees,
    pub final_absolute_altitude: Meters,
}

/// Complete result of one engine run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WellResult {
    pub metadata: WellMetadata,
    pub options: ProcessingOptions,
    pub points: Vec<ProcessedPoint>,
    pub statistics: WellStatistics,
    #[serde(default)]
    pub project_points: Vec<ProjectPoint>,
}

impl WellResult {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_point(&self) -> Option<&ProcessedPoint> {
        self.points.last()
    }

    /// TVD range covered by the trajectory.
    pub fn tvd_range(&self) -> Option<(Meters, Meters)> {
        let mut iter = self.points.iter().map(|p| p.tvd.0);
        let first = iter.next()?;
        let (lo, hi) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some((Meters(lo), Meters(hi)))
    }
}
