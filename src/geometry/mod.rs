//! Angle arithmetic and per-interval geometry primitives.

pub mod angles;
pub mod dogleg;
pub mod methods;

pub use angles::{
    average_azimuth, azimuth_difference, direction_of, direction_vector, interpolate_azimuth,
    interpolate_optional_azimuth, normalize,
};
pub use dogleg::{dogleg, dogleg_cosine, dogleg_sine};
pub use methods::{calculator_for, compute_increment, ratio_factor, Increment, SurveyNode, TrajectoryCalculator};
