//! Actual values at planned targets (stage 7).

use crate::geometry::angles::{direction_of, interpolate_optional_azimuth};
use crate::types::{ActualPoint, ProcessedPoint, ProjectPoint, TargetDepth, WellMetadata};
use crate::units::{Degrees, Meters};

fn fraction(value: f64, from: f64, to: f64) -> f64 {
    let span = to - from;
    if span.abs() < 1e-9 {
        0.0
    } else {
        (value - from) / span
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Measured depth at which the trajectory reaches `altitude`.
///
/// Absolute altitude decreases with depth; a target above the first point
/// extrapolates along the first pair, a target below the last has no depth.
fn depth_at_altitude(points: &[ProcessedPoint], altitude: Meters) -> Option<Meters> {
    if points.len() < 2 {
        return None;
    }
    let k = points.partition_point(|p| p.absolute_altitude.0 > altitude.0);
    let (a, b) = match k {
        0 => (&points[0], &points[1]),
        k if k == points.len() => return None,
        k => (&points[k - 1], &points[k]),
    };
    let t = fraction(altitude.0, a.absolute_altitude.0, b.absolute_altitude.0);
    Some(Meters(lerp(a.depth.0, b.depth.0, t)))
}

/// Bracketing pair for `depth`, or `None` past the last point.
fn bracket(points: &[ProcessedPoint], depth: Meters) -> Option<(&ProcessedPoint, &ProcessedPoint)> {
    if points.len() < 2 {
        return None;
    }
    let k = points.partition_point(|p| p.depth.0 < depth.0);
    match k {
        0 => Some((&points[0], &points[1])),
        k if k == points.len() => None,
        k => Some((&points[k - 1], &points[k])),
    }
}

/// Interpolate the trajectory at one target. `None` when the target cannot be bracketed.
pub fn resolve_target(points: &[ProcessedPoint], target: &ProjectPoint, metadata: &WellMetadata) -> Option<ActualPoint> {
    let depth = match target.depth {
        TargetDepth::MeasuredDepth(md) => md,
        TargetDepth::AbsoluteAltitude(alt) => depth_at_altitude(points, alt)?,
    };
    let (a, b) = bracket(points, depth)?;
    let t = fraction(depth.0, a.depth.0, b.depth.0);

    let x = lerp(a.x.0, b.x.0, t);
    let y = lerp(a.y.0, b.y.0, t);
    let tvd = lerp(a.tvd.0, b.tvd.0, t);
    let (planned_x, planned_y) = target.planned_xy();
    let (dx, dy) = (x - planned_x, y - planned_y);
    let deviation = dx.hypot(dy);

    Some(ActualPoint {
        depth,
        inclination: Degrees(lerp(a.inclination.0, b.inclination.0, t)),
        magnetic_azimuth: interpolate_optional_azimuth(depth, (a.magnetic_azimuth, a.depth), (b.magnetic_azimuth, b.depth)),
        true_azimuth: interpolate_optional_azimuth(depth, (a.true_azimuth, a.depth), (b.true_azimuth, b.depth)),
        x: Meters(x),
        y: Meters(y),
        tvd: Meters(tvd),
        absolute_altitude: Meters(metadata.rotor_table_altitude.0 - tvd),
        shift: Meters(x.hypot(y)),
        elongation: Meters(depth.0 - tvd),
        planned_x: Meters(planned_x),
        planned_y: Meters(planned_y),
        deviation: Meters(deviation),
        deviation_direction: direction_of(dx, dy),
        within_tolerance: deviation <= target.radius.0,
        intensity_10m: lerp(a.intensity_10m, b.intensity_10m, t),
        intensity_l: lerp(a.intensity_l, b.intensity_l, t),
    })
}

/// Copy of `targets` with actuals attached (or cleared when unresolvable).
pub fn attach_actuals(points: &[ProcessedPoint], targets: &[ProjectPoint], metadata: &WellMetadata) -> Vec<ProjectPoint> {
    targets
        .iter()
        .map(|t| ProjectPoint {
            actual: resolve_target(points, t, metadata),
            ..t.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(rotor: f64) -> Vec<ProcessedPoint> {
        // Straight hole at 0° azimuth drifting 1 m north per 10 m
        (0..=10)
            .map(|i| {
                let d = f64::from(i) * 10.0;
                ProcessedPoint {
                    depth: Meters(d),
                    x: Meters(d / 10.0),
                    tvd: Meters(d),
                    absolute_altitude: Meters(rotor - d),
                    inclination: Degrees(5.0),
                    magnetic_azimuth: Some(Degrees(0.0)),
                    ..ProcessedPoint::default()
                }
            })
            .collect()
    }

    #[test]
    fn test_target_by_measured_depth() {
        let points = line(100.0);
        let target = ProjectPoint::at_depth("T1", 0.0, 5.0, 45.0, 1.0);
        let actual = resolve_target(&points, &target, &WellMetadata { rotor_table_altitude: Meters(100.0), ..WellMetadata::default() }).unwrap();
        assert!((actual.x.0 - 4.5).abs() < 1e-12);
        assert!((actual.tvd.0 - 45.0).abs() < 1e-12);
        assert!((actual.absolute_altitude.0 - 55.0).abs() < 1e-12);
        assert!((actual.deviation.0 - 0.5).abs() < 1e-12);
        assert!(actual.within_tolerance);
        assert!((actual.deviation_direction.0 - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_target_by_altitude() {
        let points = line(100.0);
        let target = ProjectPoint::at_altitude("T2", 0.0, 0.0, 25.0, 1.0);
        let actual = resolve_target(&points, &target, &WellMetadata { rotor_table_altitude: Meters(100.0), ..WellMetadata::default() }).unwrap();
        assert!((actual.depth.0 - 75.0).abs() < 1e-9);
        assert!(!actual.within_tolerance);
    }

    #[test]
    fn test_target_beyond_last_point_has_no_actuals() {
        let points = line(0.0);
        let target = ProjectPoint::at_depth("deep", 0.0, 0.0, 150.0, 1.0);
        assert!(resolve_target(&points, &target, &WellMetadata::default()).is_none());
        assert!(resolve_target(&points[..1], &ProjectPoint::at_depth("t", 0.0, 0.0, 0.0, 1.0), &WellMetadata::default()).is_none());
    }

    #[test]
    fn test_target_above_first_point_extrapolates() {
        let points = line(0.0);
        let target = ProjectPoint::at_depth("shallow", 0.0, 0.0, -10.0, 1.0);
        let actual = resolve_target(&points, &target, &WellMetadata::default()).unwrap();
        assert!((actual.x.0 + 1.0).abs() < 1e-12);
    }
}
