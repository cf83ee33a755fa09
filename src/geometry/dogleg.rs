//! Dogleg angle between two survey stations.
//!
//! The sine form uses the mean inclination instead of the product of the two
//! endpoint sines. It matches the cosine form for small changes and drifts
//! apart at large ones, so the choice is part of the run's reproducibility
//! contract.

use crate::types::DoglegFormula;
use crate::units::{Degrees, OptionalAngle, Radians};

/// Dogleg between `(θ₁, φ₁)` and `(θ₂, φ₂)`.
///
/// When either azimuth is absent the dogleg degenerates to |θ₂ − θ₁|.
pub fn dogleg(
    formula: DoglegFormula,
    inc1: Degrees,
    az1: OptionalAngle,
    inc2: Degrees,
    az2: OptionalAngle,
) -> Radians {
    let (Some(az1), Some(az2)) = (az1, az2) else {
        return Radians((inc2 - inc1).to_radians().0.abs());
    };
    match formula {
        DoglegFormula::Cosine => dogleg_cosine(inc1, az1, inc2, az2),
        DoglegFormula::Sine => dogleg_sine(inc1, az1, inc2, az2),
    }
}

/// `cos DL = cos(θ₂−θ₁) − sin θ₁·sin θ₂·(1 − cos(φ₂−φ₁))`
pub fn dogleg_cosine(inc1: Degrees, az1: Degrees, inc2: Degrees, az2: Degrees) -> Radians {
    let t1 = inc1.to_radians().0;
    let t2 = inc2.to_radians().0;
    let dphi = (az2 - az1).to_radians().0;
    let cos_dl = (t2 - t1).cos() - t1.sin() * t2.sin() * (1.0 - dphi.cos());
    Radians(cos_dl.clamp(-1.0, 1.0).acos())
}

/// `sin²(DL/2) = sin²(Δθ/2) + sin²((θ₁+θ₂)/2)·sin²(Δφ/2)`
///
/// The right-hand side can exceed 1 for very large changes; it is clamped,
/// which saturates the dogleg at 180°.
pub fn dogleg_sine(inc1: Degrees, az1: Degrees, inc2: Degrees, az2: Degrees) -> Radians {
    let t1 = inc1.to_radians().0;
    let t2 = inc2.to_radians().0;
    let dphi = (az2 - az1).to_radians().0;
    let half_dt = ((t2 - t1) / 2.0).sin();
    let mean_t = ((t1 + t2) / 2.0).sin();
    let half_dp = (dphi / 2.0).sin();
    let s2 = half_dt * half_dt + mean_t * mean_t * half_dp * half_dp;
    Radians(2.0 * s2.clamp(0.0, 1.0).sqrt().asin())
}
