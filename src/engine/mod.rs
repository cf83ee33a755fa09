//! Whole-well processing engine.
//!
//! One call turns an [`IntervalData`] survey plus [`ProcessingOptions`] into
//! a [`WellResult`]:
//!
//! 1. Sort stations by depth and select the working azimuth per mode
//! 2. Reconstruct missing azimuths (interpolate gaps, extend last known)
//! 3. Integrate coordinates station by station, with short-scale intensity
//!    and error accumulation
//! 4. Long-scale intensity over the configured interval
//! 5. Optional depth-window smoothing of the short-scale intensity
//! 6. Statistics
//! 7. Actuals at planned targets
//!
//! The engine is pure: it reads immutable inputs, never logs, and writes only
//! to the returned result. An empty survey yields an empty result.

pub mod azimuth;
pub mod intensity;
pub mod statistics;
pub mod targets;

pub use statistics::compute_statistics;
pub use targets::{attach_actuals, resolve_target};

use crate::config::defaults::ZERO_INTERVAL_M;
use crate::geometry::angles::{average_azimuth, direction_of};
use crate::geometry::{compute_increment, dogleg, SurveyNode};
use crate::types::{
    IntervalData, MeasurementStation, ProcessedPoint, ProcessingOptions, ProjectPoint, WellResult,
};
use crate::uncertainty::{intensity_sigma, ErrorAccumulator, InstrumentErrors, PositionSigma};
use crate::units::{Degrees, Meters, OptionalAngle};

/// Caller-supplied progress hook: fraction in [0, 1] and a short message.
pub type ProgressFn<'a> = &'a mut dyn FnMut(f64, &str);

struct Progress<'a>(Option<ProgressFn<'a>>);

impl Progress<'_> {
    fn report(&mut self, fraction: f64, message: &str) {
        if let Some(cb) = self.0.as_mut() {
            (*cb)(fraction, message);
        }
    }
}

/// Process a survey without targets.
pub fn process_well(data: &IntervalData, options: &ProcessingOptions) -> WellResult {
    run(data, &[], options, Progress(None))
}

/// Process a survey and attach actuals to each planned target.
pub fn process_well_with_targets(
    data: &IntervalData,
    targets: &[ProjectPoint],
    options: &ProcessingOptions,
) -> WellResult {
    run(data, targets, options, Progress(None))
}

/// Same as [`process_well_with_targets`], reporting progress at coarse milestones.
pub fn process_well_with_progress(
    data: &IntervalData,
    targets: &[ProjectPoint],
    options: &ProcessingOptions,
    progress: ProgressFn<'_>,
) -> WellResult {
    run(data, targets, options, Progress(Some(progress)))
}

fn is_vertical(inclination: Degrees, azimuth: OptionalAngle, options: &ProcessingOptions) -> bool {
    inclination.0 <= options.verticality.critical_inclination.0
        || (options.vertical_if_no_azimuth && azimuth.is_none())
}

/// Point carrying the station echo and its derived geometry.
fn emit_point(
    station: &MeasurementStation,
    working: OptionalAngle,
    (x, y, tvd): (f64, f64, f64),
    rotor_table_altitude: Meters,
    sigma: PositionSigma,
) -> ProcessedPoint {
    ProcessedPoint {
        depth: station.depth,
        inclination: station.inclination,
        magnetic_azimuth: station.magnetic_azimuth,
        true_azimuth: station.true_azimuth,
        computed_azimuth: working,
        tool_face: station.tool_face,
        rop: station.rop,
        marker: station.marker.clone(),
        x: Meters(x),
        y: Meters(y),
        tvd: Meters(tvd),
        absolute_altitude: Meters(rotor_table_altitude.0 - tvd),
        shift: Meters(x.hypot(y)),
        direction_angle: direction_of(x, y),
        elongation: Meters(station.depth.0 - tvd),
        intensity_10m: 0.0,
        intensity_l: 0.0,
        sigma_x: sigma.x,
        sigma_y: sigma.y,
        sigma_tvd: sigma.tvd,
        sigma_intensity: 0.0,
    }
}

fn run(data: &IntervalData, targets: &[ProjectPoint], options: &ProcessingOptions, mut progress: Progress<'_>) -> WellResult {
    progress.report(0.0, "start");
    let metadata = &data.metadata;
    let mut result = WellResult {
        metadata: metadata.clone(),
        options: *options,
        ..WellResult::default()
    };

    let stations = data.sorted_stations();
    if stations.is_empty() {
        result.project_points = targets.iter().map(|t| ProjectPoint { actual: None, ..t.clone() }).collect();
        progress.report(1.0, "done");
        return result;
    }

    // Stages 1 and 2
    let mut working = azimuth::working_azimuths(&stations, metadata.magnetic_declination, options);

    // Stage 3
    let near_surface_limit = metadata
        .conductor_shoe_depth
        .unwrap_or(options.verticality.near_surface_depth);
    let errors = InstrumentErrors {
        inclination: metadata.inclination_error,
        azimuth: metadata.azimuth_error,
        depth: options.error_model.depth_error,
    };
    let confidence = options.error_model.confidence_factor;
    let rotor = metadata.rotor_table_altitude;
    let mut accumulator = ErrorAccumulator::new();
    let (mut x, mut y, mut tvd) = (0.0_f64, 0.0_f64, 0.0_f64);

    let n = stations.len();
    let mut points = Vec::with_capacity(n);
    points.push(emit_point(&stations[0], working[0], (x, y, tvd), rotor, PositionSigma::default()));

    let report_every = (n / 10).max(1);
    for i in 1..n {
        let prev = &stations[i - 1];
        let cur = &stations[i];
        let from = SurveyNode { depth: prev.depth, inclination: prev.inclination, azimuth: working[i - 1] };
        let to = SurveyNode { depth: cur.depth, inclination: cur.inclination, azimuth: working[i] };
        let length = (cur.depth - prev.depth).0;
        let degenerate = length.abs() < ZERO_INTERVAL_M;

        let missing_azimuth = options.vertical_if_no_azimuth && (from.azimuth.is_none() || to.azimuth.is_none());
        let vertical = (is_vertical(from.inclination, from.azimuth, options)
            && is_vertical(to.inclination, to.azimuth, options))
            || missing_azimuth;
        let near_surface = cur.depth.0 < near_surface_limit.0;

        let increment = compute_increment(options.method, &from, &to);
        tvd += if vertical && near_surface {
            if degenerate { 0.0 } else { length }
        } else {
            increment.dz
        };
        if !vertical {
            x += increment.dx;
            y += increment.dy;
        }

        let intensity_10m = if vertical || degenerate {
            0.0
        } else {
            let dl = dogleg(options.dogleg_formula, from.inclination, from.azimuth, to.inclination, to.azimuth);
            dl.to_degrees().0 * 10.0 / length
        };

        if options.blank_vertical_azimuth && vertical {
            working[i] = None;
        }

        let (sigma, sigma_intensity) = if options.calculate_errors {
            let mean_inclination = Degrees((from.inclination.0 + to.inclination.0) / 2.0);
            let mean_azimuth = average_azimuth(from.azimuth, to.azimuth);
            accumulator.add_interval(Meters(length), mean_inclination, mean_azimuth, &errors, &options.error_model);
            (accumulator.sigma(confidence), intensity_sigma(Meters(length), &errors) * confidence)
        } else {
            (PositionSigma::default(), 0.0)
        };

        let mut point = emit_point(cur, working[i], (x, y, tvd), rotor, sigma);
        point.intensity_10m = intensity_10m;
        point.sigma_intensity = sigma_intensity;
        if options.blank_vertical_azimuth && vertical {
            point.magnetic_azimuth = None;
            point.true_azimuth = None;
        }
        points.push(point);

        if i % report_every == 0 || i == n - 1 {
            progress.report(0.1 + 0.6 * i as f64 / (n - 1) as f64, "integrating");
        }
    }

    // Stage 4
    intensity::fill_long_intensity(&mut points, &stations, &working, options);
    progress.report(0.75, "long-scale intensity");

    // Stage 5
    if options.smooth_intensity {
        intensity::smooth_intensity(&mut points, options.smoothing_window);
    }
    progress.report(0.85, "smoothing");

    // Stages 6 and 7
    result.statistics = compute_statistics(&points);
    progress.report(0.95, "statistics");
    result.project_points = attach_actuals(&points, targets, metadata);
    result.points = points;
    progress.report(1.0, "done");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Method, WellMetadata};

    fn survey(rows: &[(f64, f64, Option<f64>)]) -> IntervalData {
        let stations = rows
            .iter()
            .map(|&(d, inc, az)| MeasurementStation {
                magnetic_azimuth: az.map(Degrees),
                ..MeasurementStation::new(d, inc)
            })
            .collect();
        IntervalData::new(WellMetadata::named("test"), stations)
    }

    #[test]
    fn test_empty_survey_yields_empty_result() {
        let data = IntervalData::new(WellMetadata::named("empty"), Vec::new());
        let result = process_well(&data, &ProcessingOptions::default());
        assert!(result.is_empty());
        assert_eq!(result.statistics, crate::types::WellStatistics::default());
    }

    #[test]
    fn test_duplicate_depths_do_not_produce_nan() {
        let data = survey(&[(0.0, 0.0, None), (50.0, 10.0, Some(45.0)), (50.0, 12.0, Some(47.0)), (80.0, 15.0, Some(50.0))]);
        let result = process_well(&data, &ProcessingOptions::default());
        for p in &result.points {
            assert!(p.x.0.is_finite() && p.y.0.is_finite() && p.tvd.0.is_finite());
            assert!(p.intensity_10m.is_finite() && p.intensity_l.is_finite());
        }
        assert_eq!(result.points[2].tvd, result.points[1].tvd);
        assert_eq!(result.points[2].intensity_10m, 0.0);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let data = survey(&[(200.0, 2.0, Some(10.0)), (0.0, 0.0, None), (100.0, 1.0, Some(10.0))]);
        let result = process_well(&data, &ProcessingOptions::default());
        let depths: Vec<f64> = result.points.iter().map(|p| p.depth.0).collect();
        assert_eq!(depths, vec![0.0, 100.0, 200.0]);
    }

    #[test]
    fn test_near_surface_vertical_keeps_offset_and_exact_tvd() {
        let mut data = survey(&[(0.0, 0.3, Some(10.0)), (10.0, 0.4, Some(10.0)), (20.0, 0.2, Some(10.0))]);
        data.metadata.conductor_shoe_depth = Some(Meters(50.0));
        let result = process_well(&data, &ProcessingOptions::default());
        for p in &result.points {
            assert_eq!(p.x.0, 0.0);
            assert_eq!(p.y.0, 0.0);
            assert_eq!(p.tvd.0, p.depth.0);
        }
    }

    #[test]
    fn test_derived_fields_are_exact() {
        let mut data = survey(&[(0.0, 0.0, None), (100.0, 10.0, Some(30.0)), (200.0, 25.0, Some(40.0)), (300.0, 40.0, Some(45.0))]);
        data.metadata.rotor_table_altitude = Meters(123.4);
        for method in Method::ALL {
            let options = ProcessingOptions { method, vertical_if_no_azimuth: false, ..ProcessingOptions::default() };
            let result = process_well(&data, &options);
            for p in &result.points {
                assert_eq!(p.absolute_altitude.0, 123.4 - p.tvd.0);
                assert_eq!(p.elongation.0, p.depth.0 - p.tvd.0);
                assert_eq!(p.shift.0, p.x.0.hypot(p.y.0));
            }
        }
    }

    #[test]
    fn test_sigmas_grow_with_depth() {
        let data = survey(&[(0.0, 0.0, None), (100.0, 10.0, Some(30.0)), (200.0, 25.0, Some(40.0)), (300.0, 40.0, Some(45.0))]);
        let result = process_well(&data, &ProcessingOptions::default());
        for pair in result.points.windows(2) {
            assert!(pair[1].sigma_tvd.0 >= pair[0].sigma_tvd.0);
            assert!(pair[1].sigma_x.0 >= pair[0].sigma_x.0);
        }
        let off = ProcessingOptions { calculate_errors: false, ..ProcessingOptions::default() };
        let result = process_well(&data, &off);
        assert!(result.points.iter().all(|p| p.sigma_tvd.0 == 0.0 && p.sigma_intensity == 0.0));
    }

    #[test]
    fn test_progress_milestones() {
        let data = survey(&[(0.0, 0.0, None), (100.0, 10.0, Some(30.0)), (200.0, 25.0, Some(40.0))]);
        let mut seen = Vec::new();
        let mut hook = |p: f64, _: &str| seen.push(p);
        let _ = process_well_with_progress(&data, &[], &ProcessingOptions::default(), &mut hook);
        assert_eq!(seen.first().copied(), Some(0.0));
        assert_eq!(seen.last().copied(), Some(1.0));
        assert!(seen.windows(2).all(|w| w[1] >= w[0]));
        assert!(seen.contains(&0.75) && seen.contains(&0.85) && seen.contains(&0.95));
    }
}
