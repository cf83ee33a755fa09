//! Checks on `incline3d.toml` before and after it is deserialised.
//!
//! The raw document is parsed as a `toml::Value` first and every dotted key
//! path is compared with the keys `AppConfig` understands; strangers are
//! reported with the nearest known key. Typed values are then range-checked.
//! Unknown keys only ever warn.

use std::collections::HashSet;

use super::AppConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `AppConfig`.
///
/// Maintained by hand to match the struct hierarchy in settings.rs and the
/// option types it embeds.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [processing]
        "processing",
        "processing.method",
        "processing.azimuth_mode",
        "processing.dogleg_formula",
        "processing.intensity_interval",
        "processing.calculate_errors",
        "processing.smooth_intensity",
        "processing.smoothing_window",
        "processing.interpolate_missing_azimuths",
        "processing.extend_last_azimuth",
        "processing.blank_vertical_azimuth",
        "processing.vertical_if_no_azimuth",
        // [processing.verticality]
        "processing.verticality",
        "processing.verticality.critical_inclination",
        "processing.verticality.near_surface_depth",
        // [processing.error_model]
        "processing.error_model",
        "processing.error_model.xy_divisor",
        "processing.error_model.confidence_factor",
        "processing.error_model.depth_error",
        // [export]
        "export",
        "export.delimiter",
        "export.decimal_separator",
        "export.encoding",
        "export.precision",
        "export.header",
        "export.fields",
        // [validation]
        "validation",
        "validation.min_depth",
        "validation.max_depth",
        "validation.max_station_gap",
        "validation.duplicate_epsilon",
        // [analysis]
        "analysis",
        "analysis.tvd_tolerance",
        "analysis.profile_step",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Collects every dotted key path of a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    let mut keys = Vec::new();
    for (k, v) in table {
        let path = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
        if v.is_table() {
            let nested = walk_toml_keys(v, &path);
            keys.push(path);
            keys.extend(nested);
        } else {
            keys.push(path);
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Edit distance counted in characters.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Closest known key within edit distance 3. Ties go to the alphabetically first key.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(d, _)| *d <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Warnings for every key in `raw_toml` that `AppConfig` does not know.
///
/// Unparsable TOML yields no warnings; serde reports the parse error.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };
    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            message: format!("Unknown config key '{key}'"),
            suggestion: suggest_correction(&key, &known),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

fn suspicious(field: &str, message: String) -> ValidationWarning {
    ValidationWarning { field: field.to_string(), message, suggestion: None }
}

/// Range checks on a parsed `AppConfig`.
///
/// Returns (errors, warnings). Errors are values the engine cannot work
/// with; warnings are legal but unusual.
pub fn validate_physical_ranges(config: &AppConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let p = &config.processing;
    if !(p.intensity_interval.0 > 0.0) {
        errors.push(format!("processing.intensity_interval = {} must be > 0 (used as divisor)", p.intensity_interval.0));
    } else if p.intensity_interval.0 > 100.0 {
        warnings.push(suspicious(
            "processing.intensity_interval",
            format!("intensity_interval = {:.1} m is longer than usual (10-100 m)", p.intensity_interval.0),
        ));
    }
    if !(p.smoothing_window.0 >= 0.0) {
        errors.push(format!("processing.smoothing_window = {} cannot be negative", p.smoothing_window.0));
    }

    let v = &p.verticality;
    if !(0.0..90.0).contains(&v.critical_inclination.0) {
        errors.push(format!(
            "processing.verticality.critical_inclination = {} is outside [0, 90) degrees",
            v.critical_inclination.0
        ));
    } else if v.critical_inclination.0 > 5.0 {
        warnings.push(suspicious(
            "processing.verticality.critical_inclination",
            format!("critical_inclination = {:.1} deg treats noticeably inclined stations as vertical", v.critical_inclination.0),
        ));
    }
    if !(v.near_surface_depth.0 >= 0.0) {
        errors.push(format!("processing.verticality.near_surface_depth = {} cannot be negative", v.near_surface_depth.0));
    }

    let e = &p.error_model;
    if !(e.xy_divisor > 0.0) {
        errors.push(format!("processing.error_model.xy_divisor = {} must be > 0 (used as divisor)", e.xy_divisor));
    }
    if !(e.confidence_factor > 0.0) {
        errors.push(format!("processing.error_model.confidence_factor = {} must be > 0", e.confidence_factor));
    } else if !(1.0..=4.0).contains(&e.confidence_factor) {
        warnings.push(suspicious(
            "processing.error_model.confidence_factor",
            format!("confidence_factor = {:.2} is outside the usual range (1-4 sigma)", e.confidence_factor),
        ));
    }
    if !(e.depth_error.0 >= 0.0) {
        errors.push(format!("processing.error_model.depth_error = {} cannot be negative", e.depth_error.0));
    }

    let x = &config.export;
    if x.delimiter == x.decimal_separator {
        errors.push(format!("export.delimiter and export.decimal_separator are both {:?}", x.delimiter));
    }
    if x.fields.is_empty() {
        errors.push("export.fields must name at least one field".to_string());
    }
    if x.precision > 12 {
        errors.push(format!("export.precision = {} exceeds 12 digits", x.precision));
    }

    let l = &config.validation;
    if !(l.min_depth.0 < l.max_depth.0) {
        errors.push(format!(
            "validation.min_depth = {} must be below validation.max_depth = {}",
            l.min_depth.0, l.max_depth.0
        ));
    }
    if !(l.max_station_gap.0 > 0.0) {
        errors.push(format!("validation.max_station_gap = {} must be > 0", l.max_station_gap.0));
    }
    if !(l.duplicate_epsilon.0 >= 0.0) {
        errors.push(format!("validation.duplicate_epsilon = {} cannot be negative", l.duplicate_epsilon.0));
    }

    let a = &config.analysis;
    if !(a.profile_step.0 > 0.0) {
        errors.push(format!("analysis.profile_step = {} must be > 0", a.profile_step.0));
    }
    if !(a.tvd_tolerance.0 >= 0.0) {
        errors.push(format!("analysis.tvd_tolerance = {} cannot be negative", a.tvd_tolerance.0));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Degrees, Meters};

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("method", "method"), 0);
        assert_eq!(levenshtein("metod", "method"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("глубина", "глубины"), 1);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [processing]
            method = "ring_arc"
            [processing.error_model]
            xy_divisor = 2.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        for k in ["processing", "processing.method", "processing.error_model", "processing.error_model.xy_divisor"] {
            assert!(keys.iter().any(|x| x == k), "{k} missing");
        }
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys("[processing]\nsmoothing_windw = 5.0\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "processing.smoothing_windw");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("processing.smoothing_window"));
        assert!(warnings[0].to_string().contains("did you mean"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[processing]
method = "minimum_curvature"
azimuth_mode = "auto"

[processing.verticality]
critical_inclination = 0.5

[export]
fields = ["depth", "tvd"]

[validation]
max_station_gap = 50.0

[analysis]
profile_step = 5.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
    }

    #[test]
    fn test_garbage_key_has_no_suggestion() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_defaults_are_clean() {
        let (errors, warnings) = validate_physical_ranges(&AppConfig::default());
        assert!(errors.is_empty(), "Defaults should produce no errors: {errors:?}");
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {warnings:?}");
    }

    #[test]
    fn test_range_errors() {
        let mut config = AppConfig::default();
        config.processing.error_model.xy_divisor = 0.0;
        config.processing.verticality.critical_inclination = Degrees(95.0);
        config.validation.min_depth = Meters(20_000.0);
        config.export.decimal_separator = ';';
        let (errors, _) = validate_physical_ranges(&config);
        for field in ["xy_divisor", "critical_inclination", "min_depth", "decimal_separator"] {
            assert!(errors.iter().any(|e| e.contains(field)), "{field} not reported: {errors:?}");
        }
    }

    #[test]
    fn test_unusual_confidence_is_warning() {
        let mut config = AppConfig::default();
        config.processing.error_model.confidence_factor = 6.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field.ends_with("confidence_factor")));
    }

    #[test]
    fn test_nan_is_rejected() {
        let mut config = AppConfig::default();
        config.processing.intensity_interval = Meters(f64::NAN);
        let (errors, _) = validate_physical_ranges(&config);
        assert_eq!(errors.len(), 1);
    }
}
