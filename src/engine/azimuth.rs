//! Working-azimuth selection and reconstruction (stages 1 and 2).
//!
//! Per station the working azimuth moves through at most one transition per
//! flag, applied in the order interpolate → extend → (emit) → blank.

use crate::geometry::angles::{interpolate_azimuth, normalize};
use crate::types::{AzimuthMode, MeasurementStation, ProcessingOptions};
use crate::units::{Degrees, OptionalAngle};

/// Pick the working azimuth of one station according to `mode`.
pub fn select_working_azimuth(
    station: &MeasurementStation,
    mode: AzimuthMode,
    declination: Degrees,
) -> OptionalAngle {
    let corrected_magnetic = station.magnetic_azimuth.map(|m| normalize(m + declination));
    match mode {
        AzimuthMode::Magnetic => corrected_magnetic,
        AzimuthMode::True => station.true_azimuth.map(normalize),
        AzimuthMode::Auto => station.true_azimuth.map(normalize).or(corrected_magnetic),
    }
}

/// Fill every absent run bounded by present values on both sides.
pub fn interpolate_gaps(working: &mut [OptionalAngle], stations: &[MeasurementStation]) {
    let n = working.len().min(stations.len());
    let mut i = 0;
    while i < n {
        if working[i].is_some() {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && working[i].is_none() {
            i += 1;
        }
        if start == 0 || i == n {
            continue;
        }
        let (Some(a), Some(b)) = (working[start - 1], working[i]) else {
            continue;
        };
        let (da, db) = (stations[start - 1].depth, stations[i].depth);
        for k in start..i {
            working[k] = Some(interpolate_azimuth(stations[k].depth, (a, da), (b, db)));
        }
    }
}

/// Forward sweep copying the most recent present value into absent slots.
pub fn extend_last_known(working: &mut [OptionalAngle]) {
    let mut last = None;
    for slot in working.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => *slot = last,
        }
    }
}

/// Stages 1 and 2 over a depth-sorted station list.
pub fn working_azimuths(
    stations: &[MeasurementStation],
    declination: Degrees,
    options: &ProcessingOptions,
) -> Vec<OptionalAngle> {
    let mut working: Vec<OptionalAngle> = stations
        .iter()
        .map(|s| select_working_azimuth(s, options.azimuth_mode, declination))
        .collect();
    if options.interpolate_missing_azimuths {
        interpolate_gaps(&mut working, stations);
    }
    if options.extend_last_azimuth {
        extend_last_known(&mut working);
    }
    working
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selection() {
        let both = MeasurementStation::new(100.0, 10.0).with_magnetic(350.0).with_true(5.0);
        let mag_only = MeasurementStation::new(100.0, 10.0).with_magnetic(355.0);
        let decl = Degrees(8.0);

        assert_eq!(select_working_azimuth(&both, AzimuthMode::Magnetic, decl), Some(Degrees(358.0)));
        assert_eq!(select_working_azimuth(&both, AzimuthMode::True, decl), Some(Degrees(5.0)));
        assert_eq!(select_working_azimuth(&both, AzimuthMode::Auto, decl), Some(Degrees(5.0)));

        let wrapped = select_working_azimuth(&mag_only, AzimuthMode::Auto, decl).unwrap();
        assert!((wrapped.0 - 3.0).abs() < 1e-9);
        assert_eq!(select_working_azimuth(&mag_only, AzimuthMode::True, decl), None);
    }

    #[test]
    fn test_gap_interpolation_leaves_open_ends() {
        let stations: Vec<MeasurementStation> =
            [0.0, 10.0, 20.0, 30.0, 40.0].iter().map(|&d| MeasurementStation::new(d, 5.0)).collect();
        let mut working = vec![None, Some(Degrees(10.0)), None, Some(Degrees(30.0)), None];
        interpolate_gaps(&mut working, &stations);
        assert_eq!(working[0], None);
        assert!((working[2].unwrap().0 - 20.0).abs() < 1e-9);
        assert_eq!(working[4], None);
    }

    #[test]
    fn test_extend_last_known() {
        let mut working = vec![None, Some(Degrees(40.0)), None, None, Some(Degrees(50.0)), None];
        extend_last_known(&mut working);
        assert_eq!(
            working,
            vec![None, Some(Degrees(40.0)), Some(Degrees(40.0)), Some(Degrees(40.0)), Some(Degrees(50.0)), Some(Degrees(50.0))]
        );
    }
}
