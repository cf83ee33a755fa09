//! Positional error propagation.
//!
//! Each interval propagates one-sigma depth, inclination and azimuth errors
//! through the mean-angle model into variance contributions on north, east
//! and TVD. The accumulator is a running sum; processed points snapshot it as
//! they are emitted and report `√var × confidence_factor`.

use crate::config::defaults::{MIN_INTERVAL_FOR_INTENSITY_SIGMA_M, SHORT_INTENSITY_INTERVAL_M};
use crate::types::ErrorModel;
use crate::units::{Degrees, Meters, OptionalAngle};

/// One-sigma instrument errors for a survey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentErrors {
    pub inclination: Degrees,
    pub azimuth: Degrees,
    pub depth: Meters,
}

/// Running variance sums along the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ErrorAccumulator {
    pub var_x: f64,
    pub var_y: f64,
    pub var_z: f64,
}

/// Confidence half-widths at one station.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionSigma {
    pub x: Meters,
    pub y: Meters,
    pub tvd: Meters,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one interval's variance contribution.
    ///
    /// North/east terms are divided by `model.xy_divisor`; the TVD term has no
    /// azimuth component and no divisor.
    pub fn add_interval(
        &mut self,
        length: Meters,
        mean_inclination: Degrees,
        mean_azimuth: OptionalAngle,
        errors: &InstrumentErrors,
        model: &ErrorModel,
    ) {
        let l = length.0.abs();
        let theta = mean_inclination.to_radians().0;
        let phi = mean_azimuth.map_or(0.0, |a| a.to_radians().0);
        let s_d = errors.depth.0;
        let s_t = errors.inclination.to_radians().0;
        let s_p = errors.azimuth.to_radians().0;

        let (st, ct) = (theta.sin(), theta.cos());
        let (sp, cp) = (phi.sin(), phi.cos());

        let vx = (st * cp).powi(2) * s_d * s_d + (l * st * sp).powi(2) * s_p * s_p + (l * ct * cp).powi(2) * s_t * s_t;
        let vy = (st * sp).powi(2) * s_d * s_d + (l * st * cp).powi(2) * s_p * s_p + (l * ct * sp).powi(2) * s_t * s_t;
        let vz = ct * ct * s_d * s_d + (l * st).powi(2) * s_t * s_t;

        self.var_x += vx / model.xy_divisor;
        self.var_y += vy / model.xy_divisor;
        self.var_z += vz;
    }

    /// Confidence half-widths of the current sums.
    pub fn sigma(&self, confidence_factor: f64) -> PositionSigma {
        PositionSigma {
            x: Meters(self.var_x.max(0.0).sqrt() * confidence_factor),
            y: Meters(self.var_y.max(0.0).sqrt() * confidence_factor),
            tvd: Meters(self.var_z.max(0.0).sqrt() * confidence_factor),
        }
    }
}

/// One-sigma intensity error on the 10 m scale (°/10 m).
pub fn intensity_sigma(length: Meters, errors: &InstrumentErrors) -> f64 {
    let l = length.0.abs();
    if l < MIN_INTERVAL_FOR_INTENSITY_SIGMA_M {
        return 0.0;
    }
    let combined = errors.inclination.0.hypot(errors.azimuth.0);
    combined * SHORT_INTENSITY_INTERVAL_M / l
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors() -> InstrumentErrors {
        InstrumentErrors {
            inclination: Degrees(0.1),
            azimuth: Degrees(1.0),
            depth: Meters(0.1),
        }
    }

    #[test]
    fn test_vertical_interval_only_depth_error_on_tvd() {
        let mut acc = ErrorAccumulator::new();
        acc.add_interval(Meters(100.0), Degrees(0.0), None, &errors(), &ErrorModel::default());
        assert!((acc.var_z - 0.01).abs() < 1e-15);
        // Inclination term at θ=0 still moves north: (L·cos θ·cos φ)²·σθ² / 2
        let s_t = 0.1f64.to_radians();
        assert!((acc.var_x - (100.0 * s_t).powi(2) / 2.0).abs() < 1e-12);
        assert!(acc.var_y.abs() < 1e-15);
    }

    #[test]
    fn test_accumulator_is_monotone() {
        let mut acc = ErrorAccumulator::new();
        let model = ErrorModel::default();
        let mut last = acc.sigma(model.confidence_factor);
        for i in 0..10 {
            acc.add_interval(Meters(30.0), Degrees(5.0 * f64::from(i)), Some(Degrees(45.0)), &errors(), &model);
            let s = acc.sigma(model.confidence_factor);
            assert!(s.x.0 >= last.x.0 && s.y.0 >= last.y.0 && s.tvd.0 >= last.tvd.0);
            last = s;
        }
    }

    #[test]
    fn test_sigma_uses_confidence_factor() {
        let acc = ErrorAccumulator { var_x: 4.0, var_y: 9.0, var_z: 1.0 };
        let s = acc.sigma(1.96);
        assert!((s.x.0 - 3.92).abs() < 1e-12);
        assert!((s.y.0 - 5.88).abs() < 1e-12);
        assert!((s.tvd.0 - 1.96).abs() < 1e-12);
    }

    #[test]
    fn test_intensity_sigma() {
        let e = errors();
        let expected = (0.01f64 + 1.0).sqrt() * 10.0 / 20.0;
        assert!((intensity_sigma(Meters(20.0), &e) - expected).abs() < 1e-12);
        assert_eq!(intensity_sigma(Meters(1e-7), &e), 0.0);
    }
}
