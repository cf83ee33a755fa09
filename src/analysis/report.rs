//! Combined comparison of a base well against a target well.

use serde::{Deserialize, Serialize};

use super::deviation::{deviation_statistics, DeviationStatistics};
use super::profile::{tvd_profile, ProfileRow};
use super::proximity::{closest_approach, closest_horizontal_approach, Proximity};
use crate::config::defaults;
use crate::types::WellResult;
use crate::units::Meters;

/// Knobs for pairwise analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOptions {
    /// Maximum |ΔTVD| for a pair to count in horizontal proximity.
    #[serde(default = "default_tvd_tolerance")]
    pub tvd_tolerance: Meters,

    /// Sampling step of the TVD profile.
    #[serde(default = "default_profile_step")]
    pub profile_step: Meters,
}

fn default_tvd_tolerance() -> Meters {
    Meters(defaults::HORIZONTAL_TVD_TOLERANCE_M)
}
fn default_profile_step() -> Meters {
    Meters(defaults::PROFILE_STEP_M)
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            tvd_tolerance: default_tvd_tolerance(),
            profile_step: default_profile_step(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub base_well: String,
    pub target_well: String,
    pub proximity: Option<Proximity>,
    pub horizontal_proximity: Option<Proximity>,
    /// TVD range shared by both wells, if any.
    pub tvd_range: Option<(Meters, Meters)>,
    pub profile: Vec<ProfileRow>,
    pub base_deviation: DeviationStatistics,
    pub target_deviation: DeviationStatistics,
}

/// Intersection of two TVD ranges.
fn shared_tvd_range(base: &WellResult, target: &WellResult) -> Option<(Meters, Meters)> {
    let (lo_a, hi_a) = base.tvd_range()?;
    let (lo_b, hi_b) = target.tvd_range()?;
    let lo = lo_a.0.max(lo_b.0);
    let hi = hi_a.0.min(hi_b.0);
    (lo <= hi).then_some((Meters(lo), Meters(hi)))
}

pub fn analyze_pair(base: &WellResult, target: &WellResult, options: &AnalysisOptions) -> AnalysisReport {
    let tvd_range = shared_tvd_range(base, target);
    let profile = tvd_range
        .map(|(lo, hi)| tvd_profile(&base.points, &target.points, lo, hi, options.profile_step))
        .unwrap_or_default();

    AnalysisReport {
        base_well: base.metadata.well_name.clone(),
        target_well: target.metadata.well_name.clone(),
        proximity: closest_approach(&base.points, &target.points),
        horizontal_proximity: closest_horizontal_approach(&base.points, &target.points, options.tvd_tolerance),
        tvd_range,
        profile,
        base_deviation: deviation_statistics(&base.project_points),
        target_deviation: deviation_statistics(&target.project_points),
    }
}
