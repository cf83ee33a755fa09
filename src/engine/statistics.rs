//! Summary statistics over processed points.

use crate::types::{ProcessedPoint, WellStatistics};
use crate::units::{Degrees, Meters};

/// Running maximum that keeps the first depth at which it was reached.
///
/// Seeded from the first point, so a flat series reports the first depth.
fn max_with_depth(points: &[ProcessedPoint], value: impl Fn(&ProcessedPoint) -> f64) -> (f64, Meters) {
    let Some((first, rest)) = points.split_first() else {
        return (0.0, Meters(0.0));
    };
    rest.iter().fold((value(first), first.depth), |(best, depth), p| {
        let v = value(p);
        if v > best {
            (v, p.depth)
        } else {
            (best, depth)
        }
    })
}

/// Pure function of the point list. Empty input yields all-zero statistics.
pub fn compute_statistics(points: &[ProcessedPoint]) -> WellStatistics {
    let (max_inc, max_inc_depth) = max_with_depth(points, |p| p.inclination.0);
    let (max_i10, max_i10_depth) = max_with_depth(points, |p| p.intensity_10m);
    let (max_il, max_il_depth) = max_with_depth(points, |p| p.intensity_l);

    let mut stats = WellStatistics {
        max_inclination: Degrees(max_inc),
        max_inclination_depth: max_inc_depth,
        max_intensity_10m: max_i10,
        max_intensity_10m_depth: max_i10_depth,
        max_intensity_l: max_il,
        max_intensity_l_depth: max_il_depth,
        ..WellStatistics::default()
    };
    if let Some(last) = points.last() {
        stats.final_shift = last.shift;
        stats.final_direction = last.direction_angle;
        stats.final_absolute_altitude = last.absolute_altitude;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_maximum_wins() {
        let points: Vec<ProcessedPoint> = [(0.0, 1.0), (10.0, 4.0), (20.0, 4.0), (30.0, 2.0)]
            .iter()
            .map(|&(d, v)| ProcessedPoint {
                depth: Meters(d),
                inclination: Degrees(v * 10.0),
                intensity_10m: v,
                shift: Meters(d / 2.0),
                ..ProcessedPoint::default()
            })
            .collect();
        let stats = compute_statistics(&points);
        assert_eq!(stats.max_intensity_10m, 4.0);
        assert_eq!(stats.max_intensity_10m_depth, Meters(10.0));
        assert_eq!(stats.max_inclination, Degrees(40.0));
        assert_eq!(stats.final_shift, Meters(15.0));
    }

    #[test]
    fn test_empty_points() {
        assert_eq!(compute_statistics(&[]), WellStatistics::default());
    }

    #[test]
    fn test_flat_series_reports_first_depth() {
        let points: Vec<ProcessedPoint> = [12.5, 40.0, 80.0]
            .iter()
            .map(|&d| ProcessedPoint { depth: Meters(d), ..ProcessedPoint::default() })
            .collect();
        let stats = compute_statistics(&points);
        assert_eq!(stats.max_intensity_10m, 0.0);
        assert_eq!(stats.max_intensity_10m_depth, Meters(12.5));
        assert_eq!(stats.max_intensity_l_depth, Meters(12.5));
        assert_eq!(stats.max_inclination_depth, Meters(12.5));
    }
}
