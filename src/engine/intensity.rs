//! Long-scale intensity and depth-window smoothing (stages 4 and 5).

use crate::config::defaults::ZERO_INTERVAL_M;
use crate::geometry::dogleg;
use crate::types::{MeasurementStation, ProcessedPoint, ProcessingOptions};
use crate::units::{Meters, OptionalAngle};

/// Index `j < i` whose depth is closest to `target`. Ties go to the shallower station.
fn closest_before(stations: &[MeasurementStation], i: usize, target: Meters) -> usize {
    let head = &stations[..i];
    let k = head.partition_point(|s| s.depth.0 < target.0);
    let mut best = k.min(i - 1);
    if k > 0 {
        let below = k - 1;
        let d_below = (head[below].depth.0 - target.0).abs();
        let d_best = (head[best].depth.0 - target.0).abs();
        if d_below <= d_best {
            best = below;
        }
    }
    best
}

/// Fill `intensity_l` on every point from `i = 1` onward.
pub fn fill_long_intensity(
    points: &mut [ProcessedPoint],
    stations: &[MeasurementStation],
    working: &[OptionalAngle],
    options: &ProcessingOptions,
) {
    let interval = options.intensity_interval;
    for i in 1..points.len() {
        let j = closest_before(stations, i, stations[i].depth - interval);
        let span = (stations[i].depth - stations[j].depth).0.abs();
        let missing = working[i].is_none() || working[j].is_none();
        points[i].intensity_l = if span < ZERO_INTERVAL_M || (missing && options.vertical_if_no_azimuth) {
            0.0
        } else {
            let dl = dogleg(
                options.dogleg_formula,
                stations[j].inclination,
                working[j],
                stations[i].inclination,
                working[i],
            );
            dl.to_degrees().0 * interval.0 / span
        };
    }
}

/// Replace each short-scale intensity with the mean of the original values
/// whose depth lies within `±window` of the centre station.
pub fn smooth_intensity(points: &mut [ProcessedPoint], window: Meters) {
    let snapshot: Vec<(f64, f64)> = points.iter().map(|p| (p.depth.0, p.intensity_10m)).collect();
    let w = window.0.abs();
    for (i, point) in points.iter_mut().enumerate() {
        let centre = snapshot[i].0;
        let (sum, count) = snapshot
            .iter()
            .filter(|(d, _)| (d - centre).abs() <= w)
            .fold((0.0, 0usize), |(s, c), (_, v)| (s + v, c + 1));
        if count > 0 {
            point.intensity_10m = sum / count as f64;
        }
    }
}
