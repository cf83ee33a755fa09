//! Separation between two wells sampled on a TVD grid.

use serde::{Deserialize, Serialize};

use crate::config::defaults::MAX_PROFILE_ROWS;
use crate::types::ProcessedPoint;
use crate::units::Meters;

/// One well's position interpolated at a TVD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationAtTvd {
    pub x: f64,
    pub y: f64,
    pub tvd: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRow {
    pub tvd: Meters,
    pub distance_3d: Meters,
    pub horizontal_distance: Meters,
    pub depth_a: Meters,
    pub depth_b: Meters,
}

/// Interpolate (x, y, MD) at `tvd` from the first bracketing pair.
///
/// Falls back to the first point when no pair brackets the TVD.
pub fn interpolate_at_tvd(points: &[ProcessedPoint], tvd: Meters) -> Option<StationAtTvd> {
    let first = points.first()?;
    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (lo, hi) = if a.tvd.0 <= b.tvd.0 { (a.tvd.0, b.tvd.0) } else { (b.tvd.0, a.tvd.0) };
        if tvd.0 < lo || tvd.0 > hi {
            continue;
        }
        let span = b.tvd.0 - a.tvd.0;
        let t = if span.abs() < 1e-9 { 0.0 } else { (tvd.0 - a.tvd.0) / span };
        return Some(StationAtTvd {
            x: a.x.0 + t * (b.x.0 - a.x.0),
            y: a.y.0 + t * (b.y.0 - a.y.0),
            tvd: tvd.0,
            depth: a.depth.0 + t * (b.depth.0 - a.depth.0),
        });
    }
    Some(StationAtTvd { x: first.x.0, y: first.y.0, tvd: first.tvd.0, depth: first.depth.0 })
}

/// One row per TVD in `[from, to]` at `step`. A non-positive step or empty range yields no rows.
///
/// A step too fine for the range is widened so at most [`MAX_PROFILE_ROWS`] + 1 rows are produced.
pub fn tvd_profile(
    a: &[ProcessedPoint],
    b: &[ProcessedPoint],
    from: Meters,
    to: Meters,
    step: Meters,
) -> Vec<ProfileRow> {
    let mut rows = Vec::new();
    let span = to.0 - from.0;
    if step.0 <= 0.0 || span < 0.0 || !step.is_finite() || !span.is_finite() {
        return rows;
    }
    let step = step.0.max(span / MAX_PROFILE_ROWS as f64);
    let count = ((span / step + 1e-9).floor() as usize).min(MAX_PROFILE_ROWS);
    for k in 0..=count {
        let tvd = Meters(from.0 + k as f64 * step);
        let (Some(sa), Some(sb)) = (interpolate_at_tvd(a, tvd), interpolate_at_tvd(b, tvd)) else {
            continue;
        };
        let horizontal = (sa.x - sb.x).hypot(sa.y - sb.y);
        rows.push(ProfileRow {
            tvd,
            // Differs from the horizontal distance only where one well fell back to its first point
            distance_3d: Meters(horizontal.hypot(sa.tvd - sb.tvd)),
            horizontal_distance: Meters(horizontal),
            depth_a: Meters(sa.depth),
            depth_b: Meters(sb.depth),
        });
    }
    rows
}
