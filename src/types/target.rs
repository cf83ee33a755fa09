//! Planned target points and their interpolated actuals.

use serde::{Deserialize, Serialize};

use crate::units::{Degrees, Meters, OptionalAngle};

/// Vertical reference of a planned target: exactly one of MD or absolute altitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TargetDepth {
    MeasuredDepth(Meters),
    AbsoluteAltitude(Meters),
}

/// Horizontal base point a target shift is measured from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanOffset {
    pub north: Meters,
    pub east: Meters,
}

/// A geologist-supplied target with planned coordinates and a circular tolerance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectPoint {
    pub name: String,

    /// Geographic azimuth of the planned shift.
    pub azimuth: Degrees,

    /// Planned horizontal shift from the head (or from `base`).
    pub shift: Meters,

    pub depth: TargetDepth,

    /// Tolerance circle radius.
    #[serde(default)]
    pub radius: Meters,

    #[serde(default)]
    pub base: Option<PlanOffset>,

    /// Filled in by the engine.
    #[serde(default)]
    pub actual: Option<ActualPoint>,
}

impl ProjectPoint {
    pub fn at_depth(name: impl Into<String>, azimuth: f64, shift: f64, depth: f64, radius: f64) -> Self {
        Self {
            name: name.into(),
            azimuth: Degrees(azimuth),
            shift: Meters(shift),
            depth: TargetDepth::MeasuredDepth(Meters(depth)),
            radius: Meters(radius),
            base: None,
            actual: None,
        }
    }

    pub fn at_altitude(name: impl Into<String>, azimuth: f64, shift: f64, altitude: f64, radius: f64) -> Self {
        Self {
            depth: TargetDepth::AbsoluteAltitude(Meters(altitude)),
            ..Self::at_depth(name, azimuth, shift, 0.0, radius)
        }
    }

    /// Planned (north, east) of the target.
    pub fn planned_xy(&self) -> (f64, f64) {
        let base = self.base.unwrap_or_default();
        (
            base.north.0 + self.shift.0 * self.azimuth.cos(),
            base.east.0 + self.shift.0 * self.azimuth.sin(),
        )
    }
}

/// Trajectory values interpolated at a planned target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ActualPoint {
    pub depth: Meters,
    pub inclination: Degrees,
    pub magnetic_azimuth: OptionalAngle,
    pub true_azimuth: OptionalAngle,
    pub x: Meters,
    pub y: Meters,
    pub tvd: Meters,
    pub absolute_altitude: Meters,
    pub shift: Meters,
    pub elongation: Meters,
    pub planned_x: Meters,
    pub planned_y: Meters,
    /// Horizontal distance between planned and actual position.
    pub deviation: Meters,
    /// Direction from planned to actual position.
    pub deviation_direction: Degrees,
    pub within_tolerance: bool,
    pub intensity_10m: f64,
    pub intensity_l: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planned_xy_with_base() {
        let mut p = ProjectPoint::at_depth("T1", 90.0, 100.0, 1000.0, 25.0);
        let (x, y) = p.planned_xy();
        assert!(x.abs() < 1e-9 && (y - 100.0).abs() < 1e-9);

        p.base = Some(PlanOffset { north: Meters(10.0), east: Meters(-5.0) });
        let (x, y) = p.planned_xy();
        assert!((x - 10.0).abs() < 1e-9 && (y - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_depth_encoding() {
        let json = serde_json::to_string(&TargetDepth::AbsoluteAltitude(Meters(-1500.0))).unwrap();
        assert_eq!(json, r#"{"absolute_altitude":-1500.0}"#);
    }
}
