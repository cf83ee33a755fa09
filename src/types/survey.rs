//! Raw survey input: measurement stations and well metadata.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::units::{Degrees, Meters, OptionalAngle};

/// One row of raw survey data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MeasurementStation {
    /// Measured depth along the borehole.
    pub depth: Meters,

    /// Zenith angle, 0° vertical, 90° horizontal.
    pub inclination: Degrees,

    #[serde(default)]
    pub magnetic_azimuth: OptionalAngle,

    #[serde(default)]
    pub true_azimuth: OptionalAngle,

    /// Tool-face rotation.
    #[serde(default)]
    pub tool_face: OptionalAngle,

    /// Rate of penetration (m/h).
    #[serde(default)]
    pub rop: Option<f64>,

    #[serde(default)]
    pub marker: Option<String>,
}

impl MeasurementStation {
    /// Station with only depth and inclination.
    pub fn new(depth: f64, inclination: f64) -> Self {
        Self {
            depth: Meters(depth),
            inclination: Degrees(inclination),
            ..Self::default()
        }
    }

    /// Builder-style magnetic azimuth.
    #[must_use]
    pub fn with_magnetic(mut self, azimuth: f64) -> Self {
        self.magnetic_azimuth = Some(Degrees(azimuth));
        self
    }

    /// Builder-style true azimuth.
    #[must_use]
    pub fn with_true(mut self, azimuth: f64) -> Self {
        self.true_azimuth = Some(Degrees(azimuth));
        self
    }

    /// Whether either azimuth reading is present.
    pub fn has_azimuth(&self) -> bool {
        self.magnetic_azimuth.is_some() || self.true_azimuth.is_some()
    }
}

/// Planned bottom-hole parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlannedBottom {
    #[serde(default)]
    pub azimuth: OptionalAngle,

    #[serde(default)]
    pub shift: Option<Meters>,

    #[serde(default)]
    pub depth: Option<Meters>,
}

/// Identification and reference data of a well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WellMetadata {
    #[serde(default)]
    pub well_name: String,

    #[serde(default)]
    pub field: String,

    /// Area, licence block or location text.
    #[serde(default)]
    pub area: String,

    /// Pad / cluster number.
    #[serde(default)]
    pub pad: String,

    #[serde(default)]
    pub service_company: String,

    #[serde(default)]
    pub survey_date: Option<String>,

    /// Altitude of the rotor table above sea level.
    #[serde(default)]
    pub rotor_table_altitude: Meters,

    #[serde(default)]
    pub ground_altitude: Meters,

    /// Signed offset added to magnetic azimuths.
    #[serde(default)]
    pub magnetic_declination: Degrees,

    #[serde(default)]
    pub conductor_shoe_depth: Option<Meters>,

    #[serde(default)]
    pub target_bottom: Option<Meters>,

    #[serde(default)]
    pub current_bottom: Option<Meters>,

    #[serde(default)]
    pub planned_bottom: PlannedBottom,

    /// One-sigma inclination error of the survey instrument.
    #[serde(default = "default_inclination_error")]
    pub inclination_error: Degrees,

    /// One-sigma azimuth error of the survey instrument.
    #[serde(default = "default_azimuth_error")]
    pub azimuth_error: Degrees,
}

fn default_inclination_error() -> Degrees {
    Degrees(defaults::INCLINATION_ERROR_DEG)
}
fn default_azimuth_error() -> Degrees {
    Degrees(defaults::AZIMUTH_ERROR_DEG)
}

impl Default for WellMetadata {
    fn default() -> Self {
        Self {
            well_name: String::new(),
            field: String::new(),
            area: String::new(),
            pad: String::new(),
            service_company: String::new(),
            survey_date: None,
            rotor_table_altitude: Meters(0.0),
            ground_altitude: Meters(0.0),
            magnetic_declination: Degrees(0.0),
            conductor_shoe_depth: None,
            target_bottom: None,
            current_bottom: None,
            planned_bottom: PlannedBottom::default(),
            inclination_error: default_inclination_error(),
            azimuth_error: default_azimuth_error(),
        }
    }
}

impl WellMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            well_name: name.into(),
            ..Self::default()
        }
    }
}

/// A full well survey.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IntervalData {
    #[serde(default)]
    pub metadata: WellMetadata,

    #[serde(default)]
    pub stations: Vec<MeasurementStation>,
}

impl IntervalData {
    pub fn new(metadata: WellMetadata, stations: Vec<MeasurementStation>) -> Self {
        Self { metadata, stations }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether station depths are non-decreasing.
    pub fn is_sorted_by_depth(&self) -> bool {
        self.stations.windows(2).all(|w| w[0].depth.0 <= w[1].depth.0)
    }

    /// Stations stably sorted by depth.
    pub fn sorted_stations(&self) -> Vec<MeasurementStation> {
        let mut stations = self.stations.clone();
        stations.sort_by(|a, b| a.depth.0.total_cmp(&b.depth.0));
        stations
    }

    /// First and last station depth.
    pub fn depth_range(&self) -> Option<(Meters, Meters)> {
        let first = self.stations.first()?;
        let last = self.stations.last()?;
        Some((first.depth, last.depth))
    }
}
