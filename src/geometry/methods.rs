//! Per-interval coordinate increments.
//!
//! Every method shares one contract: given depth, inclination and optional
//! azimuth at both ends, return (Δnorth, Δeast, Δtvd). Zero-length intervals
//! yield an exact zero increment.
//!
//! Missing azimuths: an end without azimuth borrows the other end's reading;
//! with neither present the horizontal increment is zero and only the
//! vertical component is integrated.

use super::angles::{average_azimuth, direction_vector};
use super::dogleg::dogleg_cosine;
use crate::config::defaults::{RATIO_FACTOR_EPSILON, ZERO_INTERVAL_M};
use crate::types::Method;
use crate::units::{Degrees, Meters, OptionalAngle};

/// Depth, inclination and optional azimuth at one end of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurveyNode {
    pub depth: Meters,
    pub inclination: Degrees,
    pub azimuth: OptionalAngle,
}

impl SurveyNode {
    pub fn new(depth: f64, inclination: f64, azimuth: Option<f64>) -> Self {
        Self {
            depth: Meters(depth),
            inclination: Degrees(inclination),
            azimuth: azimuth.map(Degrees),
        }
    }
}

/// Coordinate increment over one interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Increment {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Increment {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0, dz: 0.0 };

    fn scaled(self, k: f64) -> Self {
        Self {
            dx: self.dx * k,
            dy: self.dy * k,
            dz: self.dz * k,
        }
    }
}

/// Total dispatch over the closed set of methods.
pub fn compute_increment(method: Method, from: &SurveyNode, to: &SurveyNode) -> Increment {
    let length = to.depth.0 - from.depth.0;
    if length.abs() < ZERO_INTERVAL_M {
        return Increment::ZERO;
    }
    let (a, b) = resolve_azimuths(from, to);
    match method {
        Method::AverageAngle => average_angle(length, from, to, a, b),
        Method::BalancedTangential => balanced_tangential(length, from, to, a, b),
        Method::MinimumCurvature | Method::MinimumCurvatureIntegral => {
            minimum_curvature(length, from, to, a, b)
        }
        Method::RingArc => ring_arc(length, from, to, a, b),
    }
}

/// Azimuths actually used for integration, and whether any horizontal direction exists.
fn resolve_azimuths(from: &SurveyNode, to: &SurveyNode) -> (OptionalAngle, OptionalAngle) {
    match (from.azimuth, to.azimuth) {
        (Some(a), Some(b)) => (Some(a), Some(b)),
        (Some(a), None) => (Some(a), Some(a)),
        (None, Some(b)) => (Some(b), Some(b)),
        (None, None) => (None, None),
    }
}

fn horizontal_or_zero(inc: Increment, has_direction: bool) -> Increment {
    if has_direction {
        inc
    } else {
        Increment { dx: 0.0, dy: 0.0, dz: inc.dz }
    }
}

fn average_angle(length: f64, from: &SurveyNode, to: &SurveyNode, a: OptionalAngle, b: OptionalAngle) -> Increment {
    let theta = ((from.inclination.0 + to.inclination.0) / 2.0).to_radians();
    let phi = average_azimuth(a, b);
    let phi_rad = phi.map_or(0.0, |p| p.to_radians().0);
    let inc = Increment {
        dx: length * theta.sin() * phi_rad.cos(),
        dy: length * theta.sin() * phi_rad.sin(),
        dz: length * theta.cos(),
    };
    horizontal_or_zero(inc, phi.is_some())
}

fn balanced_tangential(length: f64, from: &SurveyNode, to: &SurveyNode, a: OptionalAngle, b: OptionalAngle) -> Increment {
    let v1 = direction_vector(from.inclination, a);
    let v2 = direction_vector(to.inclination, b);
    let half = length / 2.0;
    let inc = Increment {
        dx: half * (v1[0] + v2[0]),
        dy: half * (v1[1] + v2[1]),
        dz: half * (v1[2] + v2[2]),
    };
    horizontal_or_zero(inc, a.is_some())
}

/// `RF = (2/DL)·tan(DL/2)`, → 1 as DL → 0.
pub fn ratio_factor(dogleg_rad: f64) -> f64 {
    if dogleg_rad.abs() < RATIO_FACTOR_EPSILON {
        1.0
    } else {
        2.0 / dogleg_rad * (dogleg_rad / 2.0).tan()
    }
}

fn minimum_curvature(length: f64, from: &SurveyNode, to: &SurveyNode, a: OptionalAngle, b: OptionalAngle) -> Increment {
    let dl = match (a, b) {
        (Some(a), Some(b)) => dogleg_cosine(from.inclination, a, to.inclination, b).0,
        _ => (to.inclination - from.inclination).to_radians().0.abs(),
    };
    balanced_tangential(length, from, to, a, b).scaled(ratio_factor(dl))
}

fn ring_arc(length: f64, from: &SurveyNode, to: &SurveyNode, a: OptionalAngle, b: OptionalAngle) -> Increment {
    let t1 = from.inclination.to_radians().0;
    let t2 = to.inclination.to_radians().0;
    if t1.sin().abs() < 1e-12 && t2.sin().abs() < 1e-12 {
        return Increment { dx: 0.0, dy: 0.0, dz: length * t1.cos().signum() };
    }
    let p1 = a.map_or(0.0, |v| v.to_radians().0);
    let p2 = b.map_or(0.0, |v| v.to_radians().0);
    let cos_d = t1.sin() * t2.sin() * (p1 - p2).cos() + t1.cos() * t2.cos();
    let arc = cos_d.clamp(-1.0, 1.0).acos();
    if arc < RATIO_FACTOR_EPSILON {
        let v = direction_vector(from.inclination, a);
        let inc = Increment { dx: length * v[0], dy: length * v[1], dz: length * v[2] };
        return horizontal_or_zero(inc, a.is_some());
    }
    let scale = (arc / 2.0).tan() / arc;
    let v1 = direction_vector(from.inclination, a);
    let v2 = direction_vector(to.inclination, b);
    let inc = Increment {
        dx: length * scale * (v1[0] + v2[0]),
        dy: length * scale * (v1[1] + v2[1]),
        dz: length * scale * (v1[2] + v2[2]),
    };
    horizontal_or_zero(inc, a.is_some())
}

// ============================================================================
// Calculator interface
// ============================================================================

/// Stable per-method calculator. Output equals [`compute_increment`] bit-for-bit.
pub trait TrajectoryCalculator: Send + Sync {
    fn method(&self) -> Method;

    fn increment(&self, from: &SurveyNode, to: &SurveyNode) -> Increment {
        compute_increment(self.method(), from, to)
    }

    /// Method name for logging
    fn name(&self) -> &'static str {
        self.method().display_name()
    }
}

pub struct AverageAngleCalculator;
pub struct BalancedTangentialCalculator;
pub struct MinimumCurvatureCalculator;
pub struct MinimumCurvatureIntegralCalculator;
pub struct RingArcCalculator;

impl TrajectoryCalculator for AverageAngleCalculator {
    fn method(&self) -> Method {
        Method::AverageAngle
    }
}

impl TrajectoryCalculator for BalancedTangentialCalculator {
    fn method(&self) -> Method {
        Method::BalancedTangential
    }
}

impl TrajectoryCalculator for MinimumCurvatureCalculator {
    fn method(&self) -> Method {
        Method::MinimumCurvature
    }
}

impl TrajectoryCalculator for MinimumCurvatureIntegralCalculator {
    fn method(&self) -> Method {
        Method::MinimumCurvatureIntegral
    }
}

impl TrajectoryCalculator for RingArcCalculator {
    fn method(&self) -> Method {
        Method::RingArc
    }
}

impl TrajectoryCalculator for Method {
    fn method(&self) -> Method {
        *self
    }
}

pub fn calculator_for(method: Method) -> Box<dyn TrajectoryCalculator> {
    match method {
        Method::AverageAngle => Box::new(AverageAngleCalculator),
        Method::BalancedTangential => Box::new(BalancedTangentialCalculator),
        Method::MinimumCurvature => Box::new(MinimumCurvatureCalculator),
        Method::MinimumCurvatureIntegral => Box::new(MinimumCurvatureIntegralCalculator),
        Method::RingArc => Box::new(RingArcCalculator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_zero_length_interval_is_exact_zero() {
        let a = SurveyNode::new(100.0, 30.0, Some(10.0));
        let b = SurveyNode::new(100.0, 35.0, Some(20.0));
        for method in Method::ALL {
            assert_eq!(compute_increment(method, &a, &b), Increment::ZERO, "{method:?}");
        }
    }

    #[test]
    fn test_vertical_interval_all_methods() {
        let a = SurveyNode::new(0.0, 0.0, None);
        let b = SurveyNode::new(100.0, 0.0, None);
        for method in Method::ALL {
            let inc = compute_increment(method, &a, &b);
            assert_eq!(inc.dx, 0.0, "{method:?}");
            assert_eq!(inc.dy, 0.0, "{method:?}");
            assert_eq!(inc.dz, 100.0, "{method:?}");
        }
    }

    #[test]
    fn test_average_angle_wraparound() {
        let a = SurveyNode::new(0.0, 45.0, Some(350.0));
        let b = SurveyNode::new(100.0, 45.0, Some(10.0));
        let inc = compute_increment(Method::AverageAngle, &a, &b);
        let s45 = 45f64.to_radians().sin();
        assert!(close(inc.dy, 0.0, 1e-9), "dy = {}", inc.dy);
        assert!(close(inc.dx, 100.0 * s45, 1e-9));
        assert!(close(inc.dz, 100.0 * 45f64.to_radians().cos(), 1e-9));
    }

    #[test]
    fn test_straight_tangent_is_identical_for_all_methods() {
        let a = SurveyNode::new(500.0, 40.0, Some(60.0));
        let b = SurveyNode::new(600.0, 40.0, Some(60.0));
        let reference = compute_increment(Method::BalancedTangential, &a, &b);
        for method in Method::ALL {
            let inc = compute_increment(method, &a, &b);
            assert!(close(inc.dx, reference.dx, 1e-9), "{method:?}");
            assert!(close(inc.dy, reference.dy, 1e-9), "{method:?}");
            assert!(close(inc.dz, reference.dz, 1e-9), "{method:?}");
        }
    }

    #[test]
    fn test_method_parity_for_small_changes() {
        let a = SurveyNode::new(1000.0, 30.0, Some(120.0));
        let b = SurveyNode::new(1100.0, 31.0, Some(121.0));
        let aa = compute_increment(Method::AverageAngle, &a, &b);
        let bt = compute_increment(Method::BalancedTangential, &a, &b);
        let mc = compute_increment(Method::MinimumCurvature, &a, &b);
        for (p, q) in [(aa, bt), (aa, mc), (bt, mc)] {
            assert!(close(p.dx, q.dx, 0.5));
            assert!(close(p.dy, q.dy, 0.5));
            assert!(close(p.dz, q.dz, 0.5));
        }
    }

    #[test]
    fn test_ring_arc_matches_minimum_curvature_on_a_build() {
        let a = SurveyNode::new(0.0, 10.0, Some(30.0));
        let b = SurveyNode::new(30.0, 25.0, Some(45.0));
        let mc = compute_increment(Method::MinimumCurvature, &a, &b);
        let ra = compute_increment(Method::RingArc, &a, &b);
        assert!(close(mc.dx, ra.dx, 1e-9) && close(mc.dy, ra.dy, 1e-9) && close(mc.dz, ra.dz, 1e-9));
    }

    #[test]
    fn test_minimum_curvature_quarter_circle() {
        // 90° build over a quarter circle of radius R: Δz = Δx = R.
        let radius = 200.0;
        let length = std::f64::consts::FRAC_PI_2 * radius;
        let a = SurveyNode::new(0.0, 0.0, Some(0.0));
        let b = SurveyNode::new(length, 90.0, Some(0.0));
        let inc = compute_increment(Method::MinimumCurvature, &a, &b);
        assert!(close(inc.dx, radius, 1e-6), "dx = {}", inc.dx);
        assert!(close(inc.dz, radius, 1e-6), "dz = {}", inc.dz);
        assert!(close(inc.dy, 0.0, 1e-9));
    }

    #[test]
    fn test_missing_azimuth_keeps_vertical_component_only() {
        let a = SurveyNode::new(0.0, 10.0, None);
        let b = SurveyNode::new(50.0, 12.0, None);
        for method in Method::ALL {
            let inc = compute_increment(method, &a, &b);
            assert_eq!(inc.dx, 0.0);
            assert_eq!(inc.dy, 0.0);
            assert!(inc.dz > 48.0 && inc.dz < 50.0);
        }
    }

    #[test]
    fn test_calculators_agree_with_enum_dispatch() {
        let a = SurveyNode::new(250.0, 12.5, Some(347.0));
        let b = SurveyNode::new(280.0, 18.0, Some(6.0));
        for method in Method::ALL {
            let calc = calculator_for(method);
            assert_eq!(calc.method(), method);
            assert_eq!(calc.increment(&a, &b), compute_increment(method, &a, &b));
            assert_eq!(method.increment(&a, &b), compute_increment(method, &a, &b));
        }
    }
}
