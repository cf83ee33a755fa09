//! LAS 2.0 survey files.
//!
//! Reads the `~V`, `~W`, `~C`, `~P` and `~A` sections; `~O` and unknown
//! sections are skipped. Header lines follow `MNEM.UNIT  VALUE : DESCRIPTION`.
//! Wrapped files are rejected. Errors carry the 1-based line number.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use super::atomic::write_atomic;
use super::columns::ColumnMap;
use super::encoding::{decode_auto, encode};
use super::error::{PersistenceError, Result};
use super::export::ExportOptions;
use crate::config::defaults::{LAS_NULL_EPSILON, LAS_NULL_VALUE};
use crate::types::{IntervalData, MeasurementStation, WellMetadata, WellResult};
use crate::units::{Degrees, Meters};

/// One `MNEM.UNIT VALUE : DESCRIPTION` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LasHeaderItem {
    pub mnemonic: String,
    pub unit: String,
    pub value: String,
    pub description: String,
}

/// Parsed LAS file: header sections plus the survey built from the ASCII block.
#[derive(Debug, Clone, PartialEq)]
pub struct LasDocument {
    pub version: String,
    pub wrap: bool,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub step: Option<f64>,
    pub null_value: f64,
    pub well: Vec<LasHeaderItem>,
    pub curves: Vec<LasHeaderItem>,
    pub parameters: Vec<LasHeaderItem>,
    pub survey: IntervalData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Version,
    Well,
    Curve,
    Parameter,
    Other,
    Ascii,
}

fn header_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([^.\s][^.]*?)\s*\.(\S*)(.*)$").expect("static regex is valid"))
}

/// Byte offset of the colon separating value from description: the first one
/// that is not part of a time such as `12:30`.
fn description_colon(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let is_time = |i: usize| {
        i > 0 && bytes[i - 1].is_ascii_digit() && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
    };
    let first = rest.find(':')?;
    Some(rest.match_indices(':').map(|(i, _)| i).find(|&i| !is_time(i)).unwrap_or(first))
}

fn parse_header_line(line: &str, number: usize) -> Result<LasHeaderItem> {
    let malformed = || PersistenceError::parse(Some(number), format!("malformed header line '{}'", line.trim()));
    let caps = header_line_re().captures(line).ok_or_else(malformed)?;
    let get = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    let rest = get(3);
    let colon = description_colon(rest).ok_or_else(malformed)?;
    Ok(LasHeaderItem {
        mnemonic: get(1).trim().to_uppercase(),
        unit: get(2).to_string(),
        value: rest[..colon].trim().to_string(),
        description: rest[colon + 1..].trim().to_string(),
    })
}

fn find<'a>(items: &'a [LasHeaderItem], mnemonics: &[&str]) -> Option<&'a LasHeaderItem> {
    items.iter().find(|i| mnemonics.contains(&i.mnemonic.as_str()))
}

fn numeric(items: &[LasHeaderItem], mnemonics: &[&str]) -> Option<f64> {
    find(items, mnemonics).and_then(|i| i.value.replace(',', ".").parse().ok())
}

fn text(items: &[LasHeaderItem], mnemonics: &[&str]) -> Option<String> {
    find(items, mnemonics).map(|i| i.value.clone()).filter(|v| !v.is_empty())
}

fn metadata_from_headers(well: &[LasHeaderItem], parameters: &[LasHeaderItem]) -> WellMetadata {
    let all: Vec<LasHeaderItem> = well.iter().chain(parameters).cloned().collect();
    let mut meta = WellMetadata::default();
    if let Some(v) = text(&all, &["WELL"]) {
        meta.well_name = v;
    }
    if let Some(v) = text(&all, &["FLD"]) {
        meta.field = v;
    }
    if let Some(v) = text(&all, &["LOC"]) {
        meta.area = v;
    }
    if let Some(v) = text(&all, &["SRVC", "COMP"]) {
        meta.service_company = v;
    }
    meta.survey_date = text(&all, &["DATE"]);
    if let Some(v) = numeric(&all, &["EKB", "EREF", "KB"]) {
        meta.rotor_table_altitude = Meters(v);
    }
    if let Some(v) = numeric(&all, &["EGL", "GL"]) {
        meta.ground_altitude = Meters(v);
    }
    if let Some(v) = numeric(&all, &["MAGDEC", "DECL"]) {
        meta.magnetic_declination = Degrees(v);
    }
    meta
}

fn is_null(value: f64, null: f64) -> bool {
    (value - null).abs() < LAS_NULL_EPSILON
}

/// Parse a decoded LAS document.
pub fn parse_las_document(text: &str) -> Result<LasDocument> {
    let mut section = None;
    let mut version_items = Vec::new();
    let mut well = Vec::new();
    let mut curves = Vec::new();
    let mut parameters = Vec::new();
    let mut rows: Vec<(usize, Vec<f64>)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('~') {
            section = Some(match rest.chars().next().map(|c| c.to_ascii_uppercase()) {
                Some('V') => Section::Version,
                Some('W') => Section::Well,
                Some('C') => Section::Curve,
                Some('P') => Section::Parameter,
                Some('A') => Section::Ascii,
                _ => Section::Other,
            });
            continue;
        }
        match section {
            None => {
                return Err(PersistenceError::parse(Some(number), "data before the first section"));
            }
            Some(Section::Version) => version_items.push(parse_header_line(line, number)?),
            Some(Section::Well) => well.push(parse_header_line(line, number)?),
            Some(Section::Curve) => curves.push(parse_header_line(line, number)?),
            Some(Section::Parameter) => parameters.push(parse_header_line(line, number)?),
            Some(Section::Other) => {}
            Some(Section::Ascii) => {
                let values = line
                    .split_whitespace()
                    .map(|t| t.parse::<f64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| PersistenceError::parse(Some(number), format!("invalid value in data row: {e}")))?;
                rows.push((number, values));
            }
        }
    }

    if version_items.is_empty() && well.is_empty() {
        return Err(PersistenceError::Format("no ~V or ~W section found".into()));
    }
    let version = self::text(&version_items, &["VERS"]).unwrap_or_else(|| "2.0".into());
    let wrap = self::text(&version_items, &["WRAP"]).is_some_and(|v| v.eq_ignore_ascii_case("YES"));
    if wrap {
        return Err(PersistenceError::Format("wrapped LAS files are not supported".into()));
    }
    if curves.is_empty() {
        return Err(PersistenceError::Format("no ~C curve section found".into()));
    }

    let null_value = numeric(&well, &["NULL"]).unwrap_or(LAS_NULL_VALUE);
    let mnemonics: Vec<&str> = curves.iter().map(|c| c.mnemonic.as_str()).collect();
    let columns = ColumnMap::from_headers(&mnemonics);
    columns.validate()?;

    let mut stations = Vec::with_capacity(rows.len());
    for (number, values) in rows {
        if values.len() != curves.len() {
            return Err(PersistenceError::parse(
                Some(number),
                format!("expected {} values, found {}", curves.len(), values.len()),
            ));
        }
        let value = |idx: Option<usize>| idx.map(|i| values[i]).filter(|v| !is_null(*v, null_value));
        let Some(depth) = value(columns.depth) else {
            continue;
        };
        let mut station = MeasurementStation::new(depth, value(columns.inclination).unwrap_or(0.0));
        station.magnetic_azimuth = value(columns.magnetic_azimuth).map(Degrees);
        station.true_azimuth = value(columns.true_azimuth).map(Degrees);
        station.tool_face = value(columns.tool_face).map(Degrees);
        station.rop = value(columns.rop);
        stations.push(station);
    }
    debug!(curves = curves.len(), stations = stations.len(), "LAS document parsed");

    Ok(LasDocument {
        version,
        wrap,
        start: numeric(&well, &["STRT"]),
        stop: numeric(&well, &["STOP"]),
        step: numeric(&well, &["STEP"]),
        null_value,
        survey: IntervalData::new(metadata_from_headers(&well, &parameters), stations),
        well,
        curves,
        parameters,
    })
}

/// Read a survey from raw LAS bytes.
pub fn read_las(bytes: &[u8]) -> Result<IntervalData> {
    let (text, _) = decode_auto(bytes);
    let doc = parse_las_document(&text)?;
    if doc.survey.is_empty() {
        return Err(PersistenceError::EmptyResult("LAS file has no data rows".into()));
    }
    Ok(doc.survey)
}

pub fn read_las_file(path: &Path) -> Result<IntervalData> {
    let bytes = std::fs::read(path).map_err(|e| PersistenceError::io(path, e))?;
    let data = read_las(&bytes)?;
    info!(path = %path.display(), stations = data.len(), "LAS survey imported");
    Ok(data)
}

// ============================================================================
// Writer
// ============================================================================

const CURVES: [(&str, &str, &str); 9] = [
    ("DEPT", "M", "MEASURED DEPTH"),
    ("INCL", "DEG", "INCLINATION"),
    ("AZIM", "DEG", "MAGNETIC AZIMUTH"),
    ("AZIT", "DEG", "TRUE AZIMUTH"),
    ("TVD", "M", "TRUE VERTICAL DEPTH"),
    ("TVDSS", "M", "TRUE VERTICAL DEPTH SUBSEA"),
    ("NORTH", "M", "NORTH OFFSET"),
    ("EAST", "M", "EAST OFFSET"),
    ("DLS", "DEG/10M", "DOGLEG SEVERITY"),
];

fn header_line(out: &mut String, mnemonic: &str, unit: &str, value: &str, description: &str) {
    let left = format!("{mnemonic}.{unit}");
    out.push_str(&format!(" {left:<14} {value:>18} : {description}\n"));
}

/// Render a processed well as LAS 2.0 text. Numbers always use `.` as the decimal mark.
pub fn format_las(result: &WellResult, options: &ExportOptions) -> String {
    let meta = &result.metadata;
    let fmt = |v: f64| format!("{v:.prec$}", prec = options.precision);
    let null = fmt(LAS_NULL_VALUE);
    let first = result.points.first().map_or(0.0, |p| p.depth.0);
    let last = result.points.last().map_or(0.0, |p| p.depth.0);

    let mut out = String::new();
    out.push_str("~Version Information\n");
    header_line(&mut out, "VERS", "", "2.0", "CWLS LOG ASCII STANDARD - VERSION 2.0");
    header_line(&mut out, "WRAP", "", "NO", "ONE LINE PER DEPTH STEP");

    out.push_str("~Well Information\n");
    header_line(&mut out, "STRT", "M", &fmt(first), "START DEPTH");
    header_line(&mut out, "STOP", "M", &fmt(last), "STOP DEPTH");
    header_line(&mut out, "STEP", "M", &fmt(0.0), "STEP (IRREGULAR)");
    header_line(&mut out, "NULL", "", &null, "NULL VALUE");
    header_line(&mut out, "WELL", "", &meta.well_name, "WELL");
    header_line(&mut out, "FLD", "", &meta.field, "FIELD");
    header_line(&mut out, "LOC", "", &meta.area, "LOCATION");
    header_line(&mut out, "SRVC", "", &meta.service_company, "SERVICE COMPANY");
    header_line(&mut out, "DATE", "", meta.survey_date.as_deref().unwrap_or(""), "SURVEY DATE");

    out.push_str("~Curve Information\n");
    for (mnemonic, unit, description) in CURVES {
        header_line(&mut out, mnemonic, unit, "", description);
    }

    out.push_str("~Parameter Information\n");
    header_line(&mut out, "EKB", "M", &fmt(meta.rotor_table_altitude.0), "ROTOR TABLE ALTITUDE");
    header_line(&mut out, "EGL", "M", &fmt(meta.ground_altitude.0), "GROUND ALTITUDE");
    header_line(&mut out, "MAGDEC", "DEG", &fmt(meta.magnetic_declination.0), "MAGNETIC DECLINATION");

    out.push_str("~ASCII\n");
    for p in &result.points {
        let az = |a: Option<Degrees>| a.map_or_else(|| null.clone(), |v| fmt(v.0));
        let cells = [
            fmt(p.depth.0),
            fmt(p.inclination.0),
            az(p.magnetic_azimuth),
            az(p.true_azimuth),
            fmt(p.tvd.0),
            fmt(-p.absolute_altitude.0),
            fmt(p.x.0),
            fmt(p.y.0),
            fmt(p.intensity_10m),
        ];
        let row: Vec<String> = cells.iter().map(|c| format!("{c:>12}")).collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

/// Write a processed well as LAS 2.0 atomically.
pub fn export_las(path: &Path, result: &WellResult, options: &ExportOptions) -> Result<()> {
    if result.is_empty() {
        return Err(PersistenceError::EmptyResult(format!(
            "well '{}' has no processed points",
            result.metadata.well_name
        )));
    }
    write_atomic(path, &encode(&format_las(result, options), options.encoding))?;
    info!(path = %path.display(), rows = result.points.len(), "LAS export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
~VERSION INFORMATION
 VERS.                 2.0 : CWLS LOG ASCII STANDARD - VERSION 2.0
 WRAP.                  NO : ONE LINE PER DEPTH STEP
~WELL INFORMATION
 STRT.M              0.0 : START DEPTH
 STOP.M            200.0 : STOP DEPTH
 STEP.M              0.0 : STEP
 NULL.           -999.25 : NULL VALUE
 WELL.          PAD7-112 : WELL
 FLD.          Samotlor  : FIELD
 DATE.  2024-03-01 12:30 : SURVEY DATE
~CURVE INFORMATION
 DEPT.M                  : MEASURED DEPTH
 INCL.DEG                : INCLINATION
 AZIM.DEG                : AZIMUTH
~PARAMETER INFORMATION
 EKB.M             85.5  : KELLY BUSHING
~A
   0.0    0.0  -999.25
 100.0    2.5     45.0
 150.0 -999.25    46.0
 -999.25  3.0     47.0
 200.0    4.0     48.0
";

    #[test]
    fn test_parse_sample() {
        let doc = parse_las_document(SAMPLE).unwrap();
        assert_eq!(doc.version, "2.0");
        assert!(!doc.wrap);
        assert_eq!(doc.start, Some(0.0));
        assert_eq!(doc.stop, Some(200.0));
        assert_eq!(doc.curves.len(), 3);
        assert_eq!(doc.survey.metadata.well_name, "PAD7-112");
        assert_eq!(doc.survey.metadata.survey_date.as_deref(), Some("2024-03-01 12:30"));
        assert_eq!(doc.survey.metadata.rotor_table_altitude, Meters(85.5));

        let s = &doc.survey.stations;
        // Null depth row is dropped
        assert_eq!(s.len(), 4);
        assert_eq!(s[0].magnetic_azimuth, None);
        assert_eq!(s[2].inclination, Degrees(0.0));
        assert_eq!(s[3].magnetic_azimuth, Some(Degrees(48.0)));
    }

    #[test]
    fn test_bad_value_reports_line() {
        let broken = SAMPLE.replace(" 100.0    2.5     45.0", " 100.0    x.5     45.0");
        match parse_las_document(&broken).unwrap_err() {
            PersistenceError::Parse { line, .. } => assert_eq!(line, Some(20)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrapped_is_format_error() {
        let wrapped = SAMPLE.replace("WRAP.                  NO", "WRAP.                 YES");
        assert!(matches!(parse_las_document(&wrapped), Err(PersistenceError::Format(_))));
    }

    #[test]
    fn test_header_line_grammar() {
        let item = parse_header_line(" NULL.   -999.25 : NULL VALUE", 1).unwrap();
        assert_eq!(item.mnemonic, "NULL");
        assert_eq!(item.unit, "");
        assert_eq!(item.value, "-999.25");
        assert!(parse_header_line("no colon here", 7).is_err());
    }

    #[test]
    fn test_description_may_contain_colons() {
        let item = parse_header_line("DATE.   2024-05-01 : LOG DATE: field run 2", 3).unwrap();
        assert_eq!(item.value, "2024-05-01");
        assert_eq!(item.description, "LOG DATE: field run 2");
        let item = parse_header_line("COMP.   ACME : OPERATOR: A: B", 4).unwrap();
        assert_eq!(item.value, "ACME");
        assert_eq!(item.description, "OPERATOR: A: B");
        let item = parse_header_line("DATE.  2024-03-01 12:30 : SURVEY DATE: rig 4", 5).unwrap();
        assert_eq!(item.value, "2024-03-01 12:30");
        assert_eq!(item.description, "SURVEY DATE: rig 4");
    }

    #[test]
    fn test_writer_output_reads_back() {
        let data = parse_las_document(SAMPLE).unwrap().survey;
        let result = crate::engine::process_well(&data, &crate::types::ProcessingOptions::default());
        let text = format_las(&result, &ExportOptions::default());
        for mnemonic in ["DEPT", "INCL", "AZIM", "AZIT", "TVD", "TVDSS", "NORTH", "EAST", "DLS"] {
            assert!(text.contains(&format!(" {mnemonic}.")), "{mnemonic} missing");
        }
        let back = parse_las_document(&text).unwrap();
        assert_eq!(back.survey.len(), data.len());
        assert_eq!(back.survey.metadata.well_name, "PAD7-112");
        assert_eq!(back.survey.stations[1].magnetic_azimuth, Some(Degrees(45.0)));
    }
}
