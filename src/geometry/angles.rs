//! Wraparound-safe azimuth arithmetic.
//!
//! None of these operations fail; NaN propagates. Absent azimuths are carried
//! as `Option<Degrees>` and every rule branches on presence, not on value.

use crate::units::{Degrees, Meters, OptionalAngle};

/// Values within this distance of 360° collapse to 0°.
pub const FULL_TURN_COLLAPSE: f64 = 1e-4;

/// Normalise an angle into [0°, 360°).
pub fn normalize(angle: Degrees) -> Degrees {
    let v = angle.0;
    if v.is_nan() {
        return angle;
    }
    let mut r = v.rem_euclid(360.0);
    if (360.0 - r).abs() < FULL_TURN_COLLAPSE || r >= 360.0 {
        r = 0.0;
    }
    Degrees(r)
}

/// Shortest-arc mean of two optional azimuths.
pub fn average_azimuth(a: OptionalAngle, b: OptionalAngle) -> OptionalAngle {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(normalize(x)),
        (Some(a), Some(b)) => {
            let na = normalize(a).0;
            let nb = normalize(b).0;
            let direct = (nb - na).abs();
            let wrap = 360.0 - direct;
            let mean = if wrap < direct {
                (na + nb + 360.0) / 2.0
            } else {
                (na + nb) / 2.0
            };
            Some(normalize(Degrees(mean)))
        }
    }
}

/// Depth-linear interpolation between two present azimuths on the unrolled circle.
pub fn interpolate_azimuth(
    target_depth: Meters,
    (a1, d1): (Degrees, Meters),
    (a2, d2): (Degrees, Meters),
) -> Degrees {
    let mut a = normalize(a1).0;
    let mut b = normalize(a2).0;
    let span = d2.0 - d1.0;
    if span.abs() < 1e-9 {
        return Degrees(a);
    }
    if b - a > 180.0 {
        a += 360.0;
    } else if b - a < -180.0 {
        b += 360.0;
    }
    let t = (target_depth.0 - d1.0) / span;
    normalize(Degrees(a + t * (b - a)))
}

/// Interpolation over optional azimuths: both present interpolate, one present wins.
pub fn interpolate_optional_azimuth(
    target_depth: Meters,
    (a1, d1): (OptionalAngle, Meters),
    (a2, d2): (OptionalAngle, Meters),
) -> OptionalAngle {
    match (a1, a2) {
        (Some(a), Some(b)) => Some(interpolate_azimuth(target_depth, (a, d1), (b, d2))),
        (Some(x), None) | (None, Some(x)) => Some(normalize(x)),
        (None, None) => None,
    }
}

/// Signed shortest-arc difference `b - a` in [-180°, 180°).
pub fn azimuth_difference(a: Degrees, b: Degrees) -> Degrees {
    let d = (b.0 - a.0 + 180.0).rem_euclid(360.0) - 180.0;
    Degrees(d)
}

/// Unit tangent with X = north, Y = east, Z = down.
///
/// An absent azimuth is treated as 0°; callers handle absence separately.
pub fn direction_vector(inclination: Degrees, azimuth: OptionalAngle) -> [f64; 3] {
    let theta = inclination.to_radians().0;
    let phi = azimuth.map_or(0.0, |a| a.to_radians().0);
    [theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()]
}

/// Geographic direction of a horizontal vector, normalised to [0°, 360°).
pub fn direction_of(north: f64, east: f64) -> Degrees {
    normalize(Degrees(east.atan2(north).to_degrees()))
}
