//! Comparisons between processed wells.
//!
//! Everything here is a pure function of [`WellResult`](crate::types::WellResult)
//! values: closest approach (3-D and horizontal), a TVD-sampled separation
//! profile, deviation from planned targets, and a combined pairwise report.

pub mod deviation;
pub mod profile;
pub mod proximity;
pub mod report;

pub use deviation::{deviation_statistics, DeviationStatistics};
pub use profile::{interpolate_at_tvd, tvd_profile, ProfileRow, StationAtTvd};
pub use proximity::{closest_approach, closest_horizontal_approach, Position, Proximity};
pub use report::{analyze_pair, AnalysisOptions, AnalysisReport};
