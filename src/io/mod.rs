//! Persistence layer: measurement file readers, tabular writers and the
//! project file.
//!
//! Readers turn bytes into [`IntervalData`]; writers render a
//! [`WellResult`](crate::types::WellResult) or survey and commit it through
//! [`atomic::write_atomic`]. Every failure is a [`PersistenceError`].

pub mod atomic;
pub mod columns;
pub mod csv_import;
pub mod encoding;
pub mod error;
pub mod export;
pub mod las;
pub mod project_file;
pub mod zak;

use std::path::Path;

use tracing::debug;

pub use columns::{ColumnMap, ColumnRole};
pub use csv_import::{detect_csv, read_csv, read_csv_file, CsvDetection, CsvImportOptions};
pub use encoding::{decode_auto, detect_encoding, TextEncoding};
pub use error::{PersistenceError, Result};
pub use export::{export_csv, format_csv, ExportField, ExportOptions, HeaderStyle};
pub use las::{export_las, format_las, parse_las_document, read_las, read_las_file, LasDocument};
pub use project_file::{load_project, save_project};
pub use zak::{export_zak, format_zak, read_zak, read_zak_file};

use crate::types::{IntervalData, WellMetadata};

/// Measurement file family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementFormat {
    Csv,
    Las,
    Zak,
}

/// Identify a measurement file by extension, then by content.
pub fn detect_format(path: &Path, bytes: &[u8]) -> MeasurementFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("las") => return MeasurementFormat::Las,
        Some("zak") => return MeasurementFormat::Zak,
        _ => {}
    }

    let (text, _) = decode_auto(bytes);
    let first = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !(l.starts_with('#') && !l.starts_with("#HEADER") && !l.starts_with("#MEASUREMENTS")))
        .unwrap_or_default()
        .to_uppercase();
    if first.starts_with("~V") {
        MeasurementFormat::Las
    } else if first.starts_with("#HEADER") || first.starts_with("#MEASUREMENTS") {
        MeasurementFormat::Zak
    } else {
        MeasurementFormat::Csv
    }
}

/// Read any supported measurement file.
///
/// `metadata` fills in what the format does not carry. For LAS and ZAK the
/// file's own header wins where it has a value.
pub fn read_measurements(path: &Path, metadata: WellMetadata) -> Result<IntervalData> {
    let bytes = std::fs::read(path).map_err(|e| PersistenceError::io(path, e))?;
    let format = detect_format(path, &bytes);
    debug!(path = %path.display(), ?format, "Measurement format detected");

    match format {
        MeasurementFormat::Csv => read_csv(&bytes, &CsvImportOptions::default(), metadata),
        MeasurementFormat::Las => read_las(&bytes).map(|d| merge_metadata(d, &metadata)),
        MeasurementFormat::Zak => read_zak(&bytes).map(|d| merge_metadata(d, &metadata)),
    }
}

fn merge_metadata(mut data: IntervalData, fallback: &WellMetadata) -> IntervalData {
    let meta = &mut data.metadata;
    for (slot, value) in [
        (&mut meta.well_name, &fallback.well_name),
        (&mut meta.field, &fallback.field),
        (&mut meta.area, &fallback.area),
        (&mut meta.pad, &fallback.pad),
        (&mut meta.service_company, &fallback.service_company),
    ] {
        if slot.is_empty() {
            slot.clone_from(value);
        }
    }
    if meta.survey_date.is_none() {
        meta.survey_date.clone_from(&fallback.survey_date);
    }
    if meta.conductor_shoe_depth.is_none() {
        meta.conductor_shoe_depth = fallback.conductor_shoe_depth;
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension_and_content() {
        assert_eq!(detect_format(Path::new("a.LAS"), b""), MeasurementFormat::Las);
        assert_eq!(detect_format(Path::new("a.zak"), b""), MeasurementFormat::Zak);
        assert_eq!(detect_format(Path::new("a.txt"), b"# exported\n~Version\n"), MeasurementFormat::Las);
        assert_eq!(detect_format(Path::new("a.txt"), b"#HEADER\nWELL=1\n"), MeasurementFormat::Zak);
        assert_eq!(detect_format(Path::new("a.dat"), b"MD;INC\n0;0\n"), MeasurementFormat::Csv);
    }

    #[test]
    fn test_read_measurements_fills_missing_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.zak");
        std::fs::write(&path, "#HEADER\nFIELD=North\n#MEASUREMENTS\n0;0;0\n100;1;10\n#END\n").unwrap();
        let data = read_measurements(&path, WellMetadata::named("W-9")).unwrap();
        assert_eq!(data.metadata.well_name, "W-9");
        assert_eq!(data.metadata.field, "North");
        assert_eq!(data.len(), 2);
    }
}
