//! Survey validation and auto-fix.
//!
//! Checks split into errors (the data is unusable as given) and warnings
//! (processing is possible with caveats). Validation never stops at the first
//! problem; every issue is collected into a [`ValidationReport`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::geometry::normalize as normalize_angle;
use crate::io::PersistenceError;
use crate::types::{IntervalData, MeasurementStation};
use crate::units::{Degrees, Meters};

/// Kind of rule that fired.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    NonFiniteValue,
    DepthOutOfRange,
    InclinationOutOfRange,
    AzimuthOutOfRange,
    EmptySurvey,
    EndBeforeStart,
    NotMonotonic,
    DuplicateDepth,
    MissingAzimuths,
    CoverageGap,
}

/// One rule violation. `station` is the 0-based row index when the issue
/// belongs to a single station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub station: Option<usize>,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    fn at(station: usize, code: IssueCode, message: impl Into<String>) -> Self {
        Self { station: Some(station), code, message: message.into() }
    }

    fn well(code: IssueCode, message: impl Into<String>) -> Self {
        Self { station: None, code, message: message.into() }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.station {
            Some(i) => write!(f, "row {}: {}", i + 1, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Configurable thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValidationLimits {
    #[serde(default = "default_min_depth")]
    pub min_depth: Meters,

    #[serde(default = "default_max_depth")]
    pub max_depth: Meters,

    /// Consecutive stations further apart than this raise a coverage warning.
    #[serde(default = "default_max_station_gap")]
    pub max_station_gap: Meters,

    #[serde(default = "default_duplicate_epsilon")]
    pub duplicate_epsilon: Meters,
}

fn default_min_depth() -> Meters {
    Meters(defaults::MIN_PLAUSIBLE_DEPTH_M)
}
fn default_max_depth() -> Meters {
    Meters(defaults::MAX_PLAUSIBLE_DEPTH_M)
}
fn default_max_station_gap() -> Meters {
    Meters(defaults::MAX_STATION_GAP_M)
}
fn default_duplicate_epsilon() -> Meters {
    Meters(defaults::DUPLICATE_DEPTH_EPSILON_M)
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_depth: default_min_depth(),
            max_depth: default_max_depth(),
            max_station_gap: default_max_station_gap(),
            duplicate_epsilon: default_duplicate_epsilon(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Errors become [`PersistenceError::Validation`]; a clean report is returned as-is.
    pub fn into_result(self) -> Result<Self, PersistenceError> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(PersistenceError::Validation(self.errors))
        }
    }
}

/// Range checks on a single station.
pub fn validate_station(index: usize, station: &MeasurementStation, limits: &ValidationLimits) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let depth = station.depth.0;
    if !depth.is_finite() {
        issues.push(ValidationIssue::at(index, IssueCode::NonFiniteValue, "depth is not a finite number"));
    } else if depth < limits.min_depth.0 || depth > limits.max_depth.0 {
        issues.push(ValidationIssue::at(
            index,
            IssueCode::DepthOutOfRange,
            format!("depth {depth} m outside [{}, {}] m", limits.min_depth.0, limits.max_depth.0),
        ));
    }

    let inc = station.inclination.0;
    if !inc.is_finite() {
        issues.push(ValidationIssue::at(index, IssueCode::NonFiniteValue, "inclination is not a finite number"));
    } else if !(0.0..=180.0).contains(&inc) {
        issues.push(ValidationIssue::at(
            index,
            IssueCode::InclinationOutOfRange,
            format!("inclination {inc}° outside [0, 180]°"),
        ));
    }

    for (label, azimuth) in [("magnetic azimuth", station.magnetic_azimuth), ("true azimuth", station.true_azimuth)] {
        let Some(Degrees(az)) = azimuth else {
            continue;
        };
        if !az.is_finite() {
            issues.push(ValidationIssue::at(index, IssueCode::NonFiniteValue, format!("{label} is not a finite number")));
        } else if !(0.0..=360.0).contains(&az) {
            issues.push(ValidationIssue::at(
                index,
                IssueCode::AzimuthOutOfRange,
                format!("{label} {az}° outside [0, 360]°"),
            ));
        }
    }
    issues
}

/// Validate a whole survey in its given order.
pub fn validate_survey(data: &IntervalData, limits: &ValidationLimits) -> ValidationReport {
    let mut report = ValidationReport::default();
    let stations = &data.stations;

    if stations.is_empty() {
        report.errors.push(ValidationIssue::well(IssueCode::EmptySurvey, "survey has no stations"));
        return report;
    }

    for (i, s) in stations.iter().enumerate() {
        report.errors.extend(validate_station(i, s, limits));
    }

    if let (Some(first), Some(last)) = (stations.first(), stations.last()) {
        if last.depth.0 < first.depth.0 {
            report.errors.push(ValidationIssue::well(
                IssueCode::EndBeforeStart,
                format!("last depth {} m is above first depth {} m", last.depth.0, first.depth.0),
            ));
        }
    }

    for (i, pair) in stations.windows(2).enumerate() {
        let (a, b) = (pair[0].depth.0, pair[1].depth.0);
        let step = b - a;
        if step.abs() < limits.duplicate_epsilon.0 {
            report.warnings.push(ValidationIssue::at(
                i + 1,
                IssueCode::DuplicateDepth,
                format!("depth {b} m repeats the previous station"),
            ));
        } else if step < 0.0 {
            report.errors.push(ValidationIssue::at(
                i + 1,
                IssueCode::NotMonotonic,
                format!("depth {b} m is above the previous station ({a} m)"),
            ));
        } else if step > limits.max_station_gap.0 {
            report.warnings.push(ValidationIssue::at(
                i + 1,
                IssueCode::CoverageGap,
                format!("{step:.1} m without stations above {b} m"),
            ));
        }
    }

    let missing = stations.iter().filter(|s| !s.has_azimuth()).count();
    if missing > 0 {
        report.warnings.push(ValidationIssue::well(
            IssueCode::MissingAzimuths,
            format!("{missing} of {} station(s) have no azimuth", stations.len()),
        ));
    }

    if let (Some(bottom), Some(last)) = (data.metadata.current_bottom, stations.iter().map(|s| s.depth.0).reduce(f64::max)) {
        if bottom.0 - last > limits.max_station_gap.0 {
            report.warnings.push(ValidationIssue::well(
                IssueCode::CoverageGap,
                format!("survey ends {:.1} m above the current bottom", bottom.0 - last),
            ));
        }
    }

    report
}

/// What [`normalize`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub wrapped_azimuths: usize,
    pub sorted: bool,
}

impl NormalizeSummary {
    pub fn changed(&self) -> bool {
        self.wrapped_azimuths > 0 || self.sorted
    }
}

/// Wrap azimuths into [0°, 360°) and stable-sort stations by depth.
/// Running it twice changes nothing the second time.
pub fn normalize(data: &mut IntervalData) -> NormalizeSummary {
    let mut summary = NormalizeSummary::default();
    for s in &mut data.stations {
        for slot in [&mut s.magnetic_azimuth, &mut s.true_azimuth, &mut s.tool_face] {
            if let Some(az) = slot.as_mut().filter(|a| a.0.is_finite()) {
                let wrapped = normalize_angle(*az);
                if wrapped != *az {
                    *az = wrapped;
                    summary.wrapped_azimuths += 1;
                }
            }
        }
    }
    if !data.is_sorted_by_depth() {
        data.stations = data.sorted_stations();
        summary.sorted = true;
    }
    summary
}
