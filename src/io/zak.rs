//! ZAK survey files.
//!
//! ```text
//! #HEADER
//! WELL=112
//! ALTITUDE=85.5
//! #MEASUREMENTS
//! DEPTH;INC;AZIM
//! 0;0;
//! 100;2,5;45
//! #END
//! ```
//!
//! Header keys are case-insensitive and accept the Russian names used by
//! legacy exports. The measurement block may start with a header row; the
//! delimiter is chosen per line. Cells may be double-quoted.

use std::path::Path;

use tracing::{debug, info, warn};

use super::atomic::write_atomic;
use super::columns::ColumnMap;
use super::csv_import::parse_number;
use super::encoding::{decode_auto, encode};
use super::error::{PersistenceError, Result};
use super::export::ExportOptions;
use crate::types::{IntervalData, MeasurementStation, WellMetadata};
use crate::units::{Degrees, Meters};

const HEADER_TAG: &str = "#HEADER";
const MEASUREMENTS_TAG: &str = "#MEASUREMENTS";
const END_TAG: &str = "#END";

/// Canonical header key for a raw key, if known.
fn canonical_key(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_uppercase();
    let canonical = match key.as_str() {
        "WELL" | "СКВАЖИНА" => "WELL",
        "FIELD" | "МЕСТОРОЖДЕНИЕ" => "FIELD",
        "AREA" | "ПЛОЩАДЬ" => "AREA",
        "PAD" | "CLUSTER" | "КУСТ" => "PAD",
        "COMPANY" | "ОРГАНИЗАЦИЯ" => "COMPANY",
        "DATE" | "ДАТА" => "DATE",
        "ALTITUDE" | "ALT" | "АЛЬТИТУДА" => "ALTITUDE",
        "GROUND" | "АЛЬТИТУДА ЗЕМЛИ" => "GROUND",
        "DECLINATION" | "DECL" | "СКЛОНЕНИЕ" => "DECLINATION",
        "SHOE" | "БАШМАК" => "SHOE",
        "TARGET_BOTTOM" | "ПРОЕКТНЫЙ ЗАБОЙ" => "TARGET_BOTTOM",
        "CURRENT_BOTTOM" | "ТЕКУЩИЙ ЗАБОЙ" => "CURRENT_BOTTOM",
        "INC_ERROR" => "INC_ERROR",
        "AZ_ERROR" => "AZ_ERROR",
        _ => return None,
    };
    Some(canonical)
}

fn header_number(value: &str, line: usize) -> Result<Option<f64>> {
    parse_number(value, ',').map_err(|m| PersistenceError::parse(Some(line), m))
}

fn apply_header(meta: &mut WellMetadata, key: &str, value: &str, line: usize) -> Result<()> {
    let text = || value.to_string();
    match key {
        "WELL" => meta.well_name = text(),
        "FIELD" => meta.field = text(),
        "AREA" => meta.area = text(),
        "PAD" => meta.pad = text(),
        "COMPANY" => meta.service_company = text(),
        "DATE" => meta.survey_date = Some(text()).filter(|s| !s.is_empty()),
        "ALTITUDE" => meta.rotor_table_altitude = Meters(header_number(value, line)?.unwrap_or(0.0)),
        "GROUND" => meta.ground_altitude = Meters(header_number(value, line)?.unwrap_or(0.0)),
        "DECLINATION" => meta.magnetic_declination = Degrees(header_number(value, line)?.unwrap_or(0.0)),
        "SHOE" => meta.conductor_shoe_depth = header_number(value, line)?.map(Meters),
        "TARGET_BOTTOM" => meta.target_bottom = header_number(value, line)?.map(Meters),
        "CURRENT_BOTTOM" => meta.current_bottom = header_number(value, line)?.map(Meters),
        "INC_ERROR" => {
            if let Some(v) = header_number(value, line)? {
                meta.inclination_error = Degrees(v);
            }
        }
        "AZ_ERROR" => {
            if let Some(v) = header_number(value, line)? {
                meta.azimuth_error = Degrees(v);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Delimiters the writer may use and the reader recognises. A space stands
/// for any run of whitespace.
const DELIMITERS: [char; 5] = [';', '\t', '|', ',', ' '];

/// The line with every quoted character masked, so delimiters inside quotes
/// are not seen.
fn unquoted(line: &str) -> String {
    let mut quoted = false;
    line.chars()
        .map(|c| {
            if c == '"' {
                quoted = !quoted;
                c
            } else if quoted {
                'q'
            } else {
                c
            }
        })
        .collect()
}

/// Delimiter of one measurement line. `None` means whitespace-separated.
///
/// A comma only delimits when the line is not whitespace-separated numbers
/// written with a decimal comma (`100 2,5 45`).
fn line_delimiter(line: &str) -> Option<char> {
    let visible = unquoted(line);
    if let Some(d) = [';', '\t', '|'].into_iter().find(|d| visible.contains(*d)) {
        return Some(d);
    }
    if !visible.contains(',') {
        return None;
    }
    let bytes = visible.as_bytes();
    let decimal_commas = visible.match_indices(',').all(|(i, _)| {
        i > 0 && bytes[i - 1].is_ascii_digit() && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
    });
    if decimal_commas && visible.split_whitespace().nth(1).is_some() {
        None
    } else {
        Some(',')
    }
}

/// Split a line into cells. Whitespace mode (`None`) collapses runs of blanks,
/// so an empty cell there must be written as `""`. A cell opening with `"` runs
/// to the closing quote; `""` inside it is a literal quote.
fn split_fields(line: &str, delimiter: Option<char>) -> Vec<String> {
    let is_separator = |c: char| delimiter.map_or(c.is_whitespace(), |d| c == d);
    let mut chars = line.trim().chars().peekable();
    let mut cells = Vec::new();
    loop {
        while chars.next_if(|&c| c.is_whitespace() && Some(c) != delimiter).is_some() {}
        let mut cell = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                if c == '"' && chars.next_if_eq(&'"').is_none() {
                    break;
                }
                cell.push(c);
            }
            while let Some(c) = chars.next_if(|&c| !is_separator(c)) {
                if !c.is_whitespace() {
                    cell.push(c);
                }
            }
        } else {
            while let Some(c) = chars.next_if(|&c| !is_separator(c)) {
                cell.push(c);
            }
            cell.truncate(cell.trim_end().len());
        }
        cells.push(cell);
        if chars.next().is_none() {
            break;
        }
    }
    cells
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Preamble,
    Header,
    Measurements,
}

/// Parse decoded ZAK text.
pub fn parse_zak(text: &str) -> Result<IntervalData> {
    let mut block = Block::Preamble;
    let mut seen_measurements = false;
    let mut meta = WellMetadata::default();
    let mut columns: Option<ColumnMap> = None;
    let mut stations = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let tag = line.to_uppercase();
        if tag == HEADER_TAG {
            block = Block::Header;
            continue;
        }
        if tag == MEASUREMENTS_TAG {
            block = Block::Measurements;
            seen_measurements = true;
            continue;
        }
        if tag == END_TAG {
            break;
        }
        if line.starts_with('#') {
            continue;
        }

        match block {
            Block::Preamble => {
                return Err(PersistenceError::parse(Some(number), "content before #HEADER or #MEASUREMENTS"));
            }
            Block::Header => {
                let Some((key, value)) = line.split_once('=') else {
                    return Err(PersistenceError::parse(Some(number), format!("expected KEY=VALUE, got '{line}'")));
                };
                match canonical_key(key) {
                    Some(k) => apply_header(&mut meta, k, value.trim(), number)?,
                    None => warn!(line = number, key = key.trim(), "Unknown ZAK header key"),
                }
            }
            Block::Measurements => {
                let delimiter = line_delimiter(line);
                let cells = split_fields(line, delimiter);
                let decimal = if delimiter == Some(',') { '.' } else { ',' };

                if columns.is_none() {
                    let numeric = cells.iter().filter(|c| parse_number(c, decimal).ok().flatten().is_some()).count();
                    if numeric * 2 < cells.len() {
                        let map = ColumnMap::from_headers(&cells);
                        map.validate()?;
                        columns = Some(map);
                        continue;
                    }
                    columns = Some(ColumnMap::positional(cells.len()));
                }
                if let Some(map) = &columns {
                    if let Some(station) = parse_station(&cells, map, decimal, number)? {
                        stations.push(station);
                    }
                }
            }
        }
    }

    if !seen_measurements {
        return Err(PersistenceError::Format("no #MEASUREMENTS block found".into()));
    }
    debug!(well = %meta.well_name, stations = stations.len(), "ZAK document parsed");
    Ok(IntervalData::new(meta, stations))
}

fn parse_station(cells: &[String], columns: &ColumnMap, decimal: char, line: usize) -> Result<Option<MeasurementStation>> {
    let number = |idx: Option<usize>| -> Result<Option<f64>> {
        match idx.and_then(|i| cells.get(i)) {
            Some(cell) => parse_number(cell, decimal).map_err(|m| PersistenceError::parse(Some(line), m)),
            None => Ok(None),
        }
    };
    let (Some(depth), Some(inclination)) = (number(columns.depth)?, number(columns.inclination)?) else {
        warn!(line, "Skipping ZAK row without depth or inclination");
        return Ok(None);
    };
    Ok(Some(MeasurementStation {
        depth: Meters(depth),
        inclination: Degrees(inclination),
        magnetic_azimuth: number(columns.magnetic_azimuth)?.map(Degrees),
        true_azimuth: number(columns.true_azimuth)?.map(Degrees),
        tool_face: number(columns.tool_face)?.map(Degrees),
        rop: number(columns.rop)?,
        marker: columns
            .marker
            .and_then(|i| cells.get(i))
            .filter(|s| !s.is_empty())
            .cloned(),
    }))
}

/// Read a survey from raw ZAK bytes.
pub fn read_zak(bytes: &[u8]) -> Result<IntervalData> {
    let (text, guess) = decode_auto(bytes);
    debug!(encoding = %guess.encoding, confidence = guess.confidence, "ZAK encoding detected");
    let data = parse_zak(&text)?;
    if data.is_empty() {
        return Err(PersistenceError::EmptyResult("ZAK file has no measurement rows".into()));
    }
    Ok(data)
}

pub fn read_zak_file(path: &Path) -> Result<IntervalData> {
    let bytes = std::fs::read(path).map_err(|e| PersistenceError::io(path, e))?;
    let data = read_zak(&bytes)?;
    info!(path = %path.display(), stations = data.len(), "ZAK survey imported");
    Ok(data)
}

// ============================================================================
// Writer
// ============================================================================

/// Cell text for the writer: line breaks flattened, quoted when the reader
/// could split or trim it under any delimiter.
fn quote_cell(text: &str, delimiter: char) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    let needs_quotes = (flat.is_empty() && delimiter == ' ')
        || flat.contains(DELIMITERS)
        || flat.contains('"')
        || flat.chars().any(char::is_whitespace);
    if needs_quotes {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

/// Render a survey as ZAK text.
pub fn format_zak(data: &IntervalData, options: &ExportOptions) -> Result<String> {
    options.check()?;
    if !DELIMITERS.contains(&options.delimiter) {
        return Err(PersistenceError::Format(format!(
            "ZAK delimiter must be one of {:?}, got {:?}",
            DELIMITERS, options.delimiter
        )));
    }
    if !['.', ','].contains(&options.decimal_separator) {
        return Err(PersistenceError::Format(format!(
            "ZAK decimal separator must be '.' or ',', got {:?}",
            options.decimal_separator
        )));
    }
    let meta = &data.metadata;
    let mut out = String::new();
    out.push_str(HEADER_TAG);
    out.push('\n');

    let mut put = |key: &str, value: String| {
        out.push_str(key);
        out.push('=');
        out.push_str(&value.replace(['\r', '\n'], " "));
        out.push('\n');
    };
    put("WELL", meta.well_name.clone());
    put("FIELD", meta.field.clone());
    put("AREA", meta.area.clone());
    put("PAD", meta.pad.clone());
    put("COMPANY", meta.service_company.clone());
    put("DATE", meta.survey_date.clone().unwrap_or_default());
    put("ALTITUDE", meta.rotor_table_altitude.0.to_string());
    put("GROUND", meta.ground_altitude.0.to_string());
    put("DECLINATION", meta.magnetic_declination.0.to_string());
    let optional = |v: Option<Meters>| v.map(|m| m.0.to_string()).unwrap_or_default();
    put("SHOE", optional(meta.conductor_shoe_depth));
    put("TARGET_BOTTOM", optional(meta.target_bottom));
    put("CURRENT_BOTTOM", optional(meta.current_bottom));
    put("INC_ERROR", meta.inclination_error.0.to_string());
    put("AZ_ERROR", meta.azimuth_error.0.to_string());

    let delimiter = options.delimiter.to_string();
    out.push_str(MEASUREMENTS_TAG);
    out.push('\n');
    out.push_str(&["DEPTH", "INC", "AZIM", "AZIT", "TF", "ROP", "MARKER"].join(&delimiter));
    out.push('\n');

    let blank = if options.delimiter == ' ' { "\"\"" } else { "" };
    for s in &data.stations {
        let opt = |v: Option<f64>| v.map_or_else(|| blank.to_string(), |x| options.format_number(x));
        let cells = [
            options.format_number(s.depth.0),
            options.format_number(s.inclination.0),
            opt(s.magnetic_azimuth.map(|a| a.0)),
            opt(s.true_azimuth.map(|a| a.0)),
            opt(s.tool_face.map(|a| a.0)),
            opt(s.rop),
            quote_cell(s.marker.as_deref().unwrap_or_default(), options.delimiter),
        ];
        out.push_str(&cells.join(&delimiter));
        out.push('\n');
    }
    out.push_str(END_TAG);
    out.push('\n');
    Ok(out)
}

/// Write a survey as ZAK atomically.
pub fn export_zak(path: &Path, data: &IntervalData, options: &ExportOptions) -> Result<()> {
    if data.is_empty() {
        return Err(PersistenceError::EmptyResult(format!("well '{}' has no stations", data.metadata.well_name)));
    }
    let text = format_zak(data, options)?;
    write_atomic(path, &encode(&text, options.encoding))?;
    info!(path = %path.display(), stations = data.len(), "ZAK export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::encoding::TextEncoding;

    const SAMPLE: &str = "\
#HEADER
WELL=112
Месторождение=Самотлорское
КУСТ=7
ALTITUDE=85,5
DECLINATION=12.4
SHOE=50
#MEASUREMENTS
Глубина;Зенит;Азимут;Метка
0;0;;
100;2,5;45;KOP
150\t3.0\t46\t
200;4;48;
#END
garbage after end
";

    #[test]
    fn test_parse_sample() {
        let data = parse_zak(SAMPLE).unwrap();
        let meta = &data.metadata;
        assert_eq!(meta.well_name, "112");
        assert_eq!(meta.field, "Самотлорское");
        assert_eq!(meta.pad, "7");
        assert_eq!(meta.rotor_table_altitude, Meters(85.5));
        assert_eq!(meta.magnetic_declination, Degrees(12.4));
        assert_eq!(meta.conductor_shoe_depth, Some(Meters(50.0)));

        assert_eq!(data.len(), 4);
        assert_eq!(data.stations[0].magnetic_azimuth, None);
        assert_eq!(data.stations[1].inclination, Degrees(2.5));
        assert_eq!(data.stations[1].marker.as_deref(), Some("KOP"));
        assert_eq!(data.stations[2].magnetic_azimuth, Some(Degrees(46.0)));
    }

    #[test]
    fn test_headerless_measurements_use_positional_layout() {
        let text = "#MEASUREMENTS\n0 0 10\n50 1.5 12\n#END\n";
        let data = parse_zak(text).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.stations[1].magnetic_azimuth, Some(Degrees(12.0)));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let text = "#HEADER\nALTITUDE=high\n#MEASUREMENTS\n";
        match parse_zak(text).unwrap_err() {
            PersistenceError::Parse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(parse_zak("#HEADER\nWELL=1\n"), Err(PersistenceError::Format(_))));
    }

    #[test]
    fn test_writer_round_trip() {
        let original = parse_zak(SAMPLE).unwrap();
        for options in [
            ExportOptions::default(),
            ExportOptions { delimiter: ',', ..ExportOptions::default() },
            ExportOptions { decimal_separator: ',', encoding: TextEncoding::Windows1251, ..ExportOptions::default() },
        ] {
            let text = format_zak(&original, &options).unwrap();
            let bytes = encode(&text, options.encoding);
            assert_eq!(read_zak(&bytes).unwrap(), original);
        }
    }

    #[test]
    fn test_whitespace_rows_with_decimal_commas() {
        let text = "#MEASUREMENTS\nDEPTH INC AZIM\n100 2,5 45\n150,5   3,25 46\n#END\n";
        let data = parse_zak(text).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.stations[0].depth, Meters(100.0));
        assert_eq!(data.stations[0].inclination, Degrees(2.5));
        assert_eq!(data.stations[0].magnetic_azimuth, Some(Degrees(45.0)));
        assert_eq!(data.stations[1].depth, Meters(150.5));
        assert_eq!(data.stations[1].inclination, Degrees(3.25));
    }

    #[test]
    fn test_comma_rows_still_split_on_commas() {
        assert_eq!(line_delimiter("100,2.5,45"), Some(','));
        assert_eq!(line_delimiter("100, 2.5, 45"), Some(','));
        assert_eq!(line_delimiter("100 2,5 45"), None);
        assert_eq!(line_delimiter("100 2,5 45 \"a; b\""), None);
        assert_eq!(line_delimiter("100;2,5;45"), Some(';'));
    }

    #[test]
    fn test_quoted_cells() {
        assert_eq!(split_fields(r#"100 "" 45 "say ""hi""""#, None), vec!["100", "", "45", r#"say "hi""#]);
        assert_eq!(split_fields(r#" 1 ; "a; b" ;  ; x "#, Some(';')), vec!["1", "a; b", "", "x"]);
        assert_eq!(split_fields("1\t\t3", Some('\t')), vec!["1", "", "3"]);
    }

    #[test]
    fn test_space_delimiter_keeps_sparse_columns() {
        let station = MeasurementStation {
            depth: Meters(120.0),
            inclination: Degrees(4.0),
            true_azimuth: Some(Degrees(210.0)),
            marker: Some("top pay".to_string()),
            ..MeasurementStation::default()
        };
        let data = IntervalData::new(WellMetadata::named("9"), vec![station]);
        for decimal_separator in ['.', ','] {
            let options = ExportOptions { delimiter: ' ', decimal_separator, ..ExportOptions::default() };
            let back = parse_zak(&format_zak(&data, &options).unwrap()).unwrap();
            assert_eq!(back.stations[0].magnetic_azimuth, None);
            assert_eq!(back.stations[0].true_azimuth, Some(Degrees(210.0)));
            assert_eq!(back.stations[0].tool_face, None);
            assert_eq!(back.stations[0].marker.as_deref(), Some("top pay"));
        }
    }

    #[test]
    fn test_markers_with_delimiters_survive() {
        let station = MeasurementStation {
            depth: Meters(80.0),
            inclination: Degrees(1.5),
            marker: Some("top, base; \"shoe\"\nline|two".to_string()),
            ..MeasurementStation::default()
        };
        let data = IntervalData::new(WellMetadata::named("9"), vec![station]);
        for delimiter in [';', ',', '\t', '|', ' '] {
            let options = ExportOptions { delimiter, decimal_separator: '.', ..ExportOptions::default() };
            let back = parse_zak(&format_zak(&data, &options).unwrap()).unwrap();
            assert_eq!(back.stations[0].marker.as_deref(), Some("top, base; \"shoe\" line|two"), "{delimiter:?}");
        }
        let options = ExportOptions { delimiter: '/', ..ExportOptions::default() };
        assert!(matches!(format_zak(&data, &options), Err(PersistenceError::Format(_))));
    }
}
