//! Shared data structures for directional survey processing
//!
//! - Input: `MeasurementStation`, `WellMetadata`, `IntervalData`
//! - Configuration: `ProcessingOptions` and its enumerations
//! - Output: `ProcessedPoint`, `WellStatistics`, `WellResult`
//! - Targets: `ProjectPoint` with its interpolated `ActualPoint`

mod options;
mod result;
mod survey;
mod target;

pub use options::{AzimuthMode, DoglegFormula, ErrorModel, Method, ProcessingOptions, VerticalityOptions};
pub use result::{ProcessedPoint, WellResult, WellStatistics};
pub use survey::{IntervalData, MeasurementStation, PlannedBottom, WellMetadata};
pub use target::{ActualPoint, PlanOffset, ProjectPoint, TargetDepth};
