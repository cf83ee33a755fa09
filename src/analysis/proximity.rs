//! Closest approach between two trajectories.

use serde::{Deserialize, Serialize};

use crate::types::ProcessedPoint;
use crate::units::Meters;

/// North/east/TVD triple of one station.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: Meters,
    pub y: Meters,
    pub tvd: Meters,
}

impl From<&ProcessedPoint> for Position {
    fn from(p: &ProcessedPoint) -> Self {
        Self { x: p.x, y: p.y, tvd: p.tvd }
    }
}

/// Minimum-distance pair between two wells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proximity {
    pub min_distance: Meters,
    pub depth_a: Meters,
    pub depth_b: Meters,
    /// Mean TVD of the two stations at the minimum.
    pub tvd: Meters,
    pub point_a: Position,
    pub point_b: Position,
}

fn scan(
    a: &[ProcessedPoint],
    b: &[ProcessedPoint],
    distance: impl Fn(&ProcessedPoint, &ProcessedPoint) -> Option<f64>,
) -> Option<Proximity> {
    let mut best: Option<(f64, &ProcessedPoint, &ProcessedPoint)> = None;
    for pa in a {
        for pb in b {
            let Some(d) = distance(pa, pb) else {
                continue;
            };
            if best.map_or(true, |(min, _, _)| d < min) {
                best = Some((d, pa, pb));
            }
        }
    }
    best.map(|(d, pa, pb)| Proximity {
        min_distance: Meters(d),
        depth_a: pa.depth,
        depth_b: pb.depth,
        tvd: Meters((pa.tvd.0 + pb.tvd.0) / 2.0),
        point_a: Position::from(pa),
        point_b: Position::from(pb),
    })
}

/// 3-D closest approach. `None` if either list is empty.
pub fn closest_approach(a: &[ProcessedPoint], b: &[ProcessedPoint]) -> Option<Proximity> {
    scan(a, b, |pa, pb| {
        let (dx, dy, dz) = (pa.x.0 - pb.x.0, pa.y.0 - pb.y.0, pa.tvd.0 - pb.tvd.0);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    })
}

/// In-plane closest approach over station pairs with |ΔTVD| ≤ `tvd_tolerance`.
pub fn closest_horizontal_approach(
    a: &[ProcessedPoint],
    b: &[ProcessedPoint],
    tvd_tolerance: Meters,
) -> Option<Proximity> {
    scan(a, b, |pa, pb| {
        if (pa.tvd.0 - pb.tvd.0).abs() > tvd_tolerance.0 {
            return None;
        }
        Some((pa.x.0 - pb.x.0).hypot(pa.y.0 - pb.y.0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical(x: f64, depths: &[f64]) -> Vec<ProcessedPoint> {
        depths
            .iter()
            .map(|&d| ProcessedPoint {
                depth: Meters(d),
                tvd: Meters(d),
                x: Meters(x),
                ..ProcessedPoint::default()
            })
            .collect()
    }

    #[test]
    fn test_parallel_vertical_wells() {
        let a = vertical(0.0, &[0.0, 50.0, 100.0]);
        let b = vertical(50.0, &[0.0, 50.0, 100.0]);
        let p = closest_approach(&a, &b).unwrap();
        assert_eq!(p.min_distance, Meters(50.0));
        assert_eq!(p.depth_a, Meters(0.0));
        assert_eq!(p.point_b.x, Meters(50.0));
    }

    #[test]
    fn test_empty_input_is_undefined() {
        let a = vertical(0.0, &[0.0, 10.0]);
        assert!(closest_approach(&a, &[]).is_none());
        assert!(closest_horizontal_approach(&[], &a, Meters(5.0)).is_none());
    }

    #[test]
    fn test_horizontal_respects_tvd_tolerance() {
        let a = vertical(0.0, &[0.0, 100.0]);
        let b = vertical(30.0, &[40.0, 103.0]);
        let p = closest_horizontal_approach(&a, &b, Meters(5.0)).unwrap();
        assert_eq!(p.depth_a, Meters(100.0));
        assert_eq!(p.depth_b, Meters(103.0));
        assert_eq!(p.min_distance, Meters(30.0));
        assert!(closest_horizontal_approach(&a, &b, Meters(1.0)).is_none());
    }
}
