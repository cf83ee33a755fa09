//! Typed scalars for survey arithmetic.
//!
//! Newtype wrappers keep lengths and the two angle representations apart so
//! degrees never reach a trigonometric function by accident. All wrappers are
//! `Copy` and serialize transparently as plain JSON numbers.
//!
//! Angles are *not* normalised on construction; normalisation happens in
//! [`crate::geometry::angles`] at well-defined boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Distance in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

/// Angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

/// Azimuth reading that may be absent.
///
/// `None` means "no reading at this station", never "due north".
pub type OptionalAngle = Option<Degrees>;

macro_rules! scalar_ops {
    ($t:ident) => {
        impl $t {
            /// Raw value.
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl Add for $t {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $t {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $t {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl SubAssign for $t {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Mul<f64> for $t {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $t {
            type Output = Self;
            #[inline]
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl Neg for $t {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl From<$t> for f64 {
            #[inline]
            fn from(v: $t) -> f64 {
                v.0
            }
        }
    };
}

scalar_ops!(Meters);
scalar_ops!(Degrees);
scalar_ops!(Radians);

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }

    #[inline]
    pub fn sin(self) -> f64 {
        self.0.to_radians().sin()
    }

    #[inline]
    pub fn cos(self) -> f64 {
        self.0.to_radians().cos()
    }
}

impl Radians {
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }
}

impl From<Degrees> for Radians {
    fn from(d: Degrees) -> Self {
        d.to_radians()
    }
}

impl From<Radians> for Degrees {
    fn from(r: Radians) -> Self {
        r.to_degrees()
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m", self.0)
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}\u{00b0}", self.0)
    }
}

impl fmt::Display for Radians {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} rad", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_radian_roundtrip() {
        let d = Degrees(37.5);
        let back = d.to_radians().to_degrees();
        assert!((back.0 - 37.5).abs() < 1e-12);
    }

    #[test]
    fn test_meters_arithmetic() {
        let a = Meters(100.0);
        let b = Meters(25.5);
        assert_eq!(a - b, Meters(74.5));
        assert_eq!((a + b) * 2.0, Meters(251.0));
        assert_eq!(-a, Meters(-100.0));
    }

    #[test]
    fn test_transparent_serialization() {
        let json = serde_json::to_string(&Meters(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let angle: OptionalAngle = serde_json::from_str("null").unwrap();
        assert!(angle.is_none());
        let angle: OptionalAngle = serde_json::from_str("0.0").unwrap();
        assert_eq!(angle, Some(Degrees(0.0)));
    }
}
