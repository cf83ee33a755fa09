//! Delimited-text survey import with auto-detection.
//!
//! Detection runs on a sample of the decoded text:
//! - encoding: BOM, UTF-8 validity, Cyrillic byte frequency
//! - delimiter: `;`, `,`, tab or `|` by per-line consistency, then total count
//! - header: first row mostly text rather than numbers
//! - columns: alias lookup in [`ColumnMap`]
//! - decimal separator: comma vs dot frequency among data cells
//!
//! The resulting [`CsvDetection`] carries a confidence score for the caller
//! to decide whether to confirm with the user. It never gates the import;
//! every detected property can be overridden through [`CsvImportOptions`].

use std::path::Path;
use std::sync::OnceLock;

use csv::{ReaderBuilder, Trim};
use regex::Regex;
use tracing::{debug, info, warn};

use super::columns::ColumnMap;
use super::encoding::{decode, detect_encoding, TextEncoding};
use super::error::{PersistenceError, Result};
use crate::config::defaults::DETECTION_SAMPLE_LINES;
use crate::types::{IntervalData, MeasurementStation, WellMetadata};
use crate::units::{Degrees, Meters};

pub const DELIMITER_CANDIDATES: [char; 4] = [';', ',', '\t', '|'];

/// Share of sample lines that must agree on a delimiter count.
const CONSISTENCY_THRESHOLD: f64 = 0.9;

/// Everything the detector decided about a file.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDetection {
    pub encoding: TextEncoding,
    pub delimiter: char,
    pub has_header: bool,
    pub decimal_separator: char,
    pub columns: ColumnMap,
    /// Overall confidence in [0, 1].
    pub confidence: f64,
}

/// Manual overrides for any detected property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvImportOptions {
    pub encoding: Option<TextEncoding>,
    pub delimiter: Option<char>,
    pub has_header: Option<bool>,
    pub decimal_separator: Option<char>,
    pub columns: Option<ColumnMap>,
}

fn decimal_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+,\d+$").expect("static regex is valid"))
}

fn decimal_dot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d*\.\d+([eE][+-]?\d+)?$").expect("static regex is valid"))
}

fn sample_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .take(DETECTION_SAMPLE_LINES)
        .collect()
}

/// Best delimiter and the share of lines consistent with it.
pub fn detect_delimiter(lines: &[&str]) -> (char, f64) {
    let mut best = (';', 0.0_f64, 0_usize);
    let mut best_preferred: Option<(char, f64, usize)> = None;

    for candidate in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = lines.iter().map(|l| count_unquoted(l, candidate)).collect();
        let total: usize = counts.iter().sum();
        if total == 0 {
            continue;
        }
        let modal = modal_count(&counts);
        let consistent = counts.iter().filter(|&&c| c == modal).count();
        let consistency = consistent as f64 / counts.len() as f64;

        // A decimal comma also repeats consistently, so a consistent
        // non-comma delimiter wins over the comma outright.
        if candidate != ',' && consistency >= CONSISTENCY_THRESHOLD {
            let better = best_preferred.map_or(true, |(_, c, t)| consistency > c || (consistency == c && total > t));
            if better {
                best_preferred = Some((candidate, consistency, total));
            }
        }
        if consistency > best.1 || (consistency == best.1 && total > best.2) {
            best = (candidate, consistency, total);
        }
    }

    let (delimiter, consistency, _) = best_preferred.unwrap_or(best);
    (delimiter, consistency)
}

/// Occurrences of `c` outside double-quoted text.
fn count_unquoted(line: &str, c: char) -> usize {
    let mut quoted = false;
    line.chars()
        .filter(|&ch| {
            if ch == '"' {
                quoted = !quoted;
            }
            ch == c && !quoted
        })
        .count()
}

fn modal_count(counts: &[usize]) -> usize {
    let mut sorted: Vec<usize> = counts.iter().copied().filter(|&c| c > 0).collect();
    sorted.sort_unstable();
    let mut best = (0, 0);
    let mut i = 0;
    while i < sorted.len() {
        let j = sorted[i..].iter().take_while(|&&c| c == sorted[i]).count();
        if j > best.1 {
            best = (sorted[i], j);
        }
        i += j;
    }
    best.0
}

fn looks_numeric(cell: &str) -> bool {
    let cell = cell.trim();
    !cell.is_empty() && (decimal_comma_re().is_match(cell) || decimal_dot_re().is_match(cell) || cell.parse::<f64>().is_ok())
}

/// Comma-vs-dot decimal separator among data cells.
pub fn detect_decimal_separator<'a>(cells: impl IntoIterator<Item = &'a str>, delimiter: char) -> char {
    if delimiter == ',' {
        return '.';
    }
    let (mut commas, mut dots) = (0usize, 0usize);
    for cell in cells {
        let cell = cell.trim();
        if decimal_comma_re().is_match(cell) {
            commas += 1;
        } else if decimal_dot_re().is_match(cell) {
            dots += 1;
        }
    }
    if commas > dots {
        ','
    } else {
        '.'
    }
}

/// Cells of one sample line. Delimiters inside double quotes do not split.
fn split_cells(line: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.next_if_eq(&'"').is_some() => cell.push('"'),
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => cells.push(std::mem::take(&mut cell).trim().to_string()),
            c => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

/// Detect layout from decoded text.
pub fn detect_layout(text: &str, encoding: TextEncoding, encoding_confidence: f64) -> Result<CsvDetection> {
    layout_with_delimiter(text, encoding, encoding_confidence, None)
}

/// Layout detection with the delimiter optionally fixed by the caller, so the
/// header and columns are read with the delimiter actually used.
fn layout_with_delimiter(
    text: &str,
    encoding: TextEncoding,
    encoding_confidence: f64,
    delimiter: Option<char>,
) -> Result<CsvDetection> {
    let lines = sample_lines(text);
    let Some(first) = lines.first() else {
        return Err(PersistenceError::Format("file contains no data lines".into()));
    };

    let (delimiter, consistency) = match delimiter {
        Some(d) => (d, 1.0),
        None => detect_delimiter(&lines),
    };
    let first_cells = split_cells(first, delimiter);
    let numeric = first_cells.iter().filter(|c| looks_numeric(c)).count();
    let has_header = numeric * 2 < first_cells.len();

    let data_lines = if has_header { &lines[1..] } else { &lines[..] };
    let data_cells: Vec<String> = data_lines.iter().flat_map(|l| split_cells(l, delimiter)).collect();
    let decimal_separator = detect_decimal_separator(data_cells.iter().map(String::as_str), delimiter);

    let columns = if has_header {
        ColumnMap::from_headers(&first_cells)
    } else {
        ColumnMap::positional(first_cells.len())
    };

    let confidence = (0.2 * encoding_confidence + 0.4 * consistency + 0.4 * columns.coverage().max(0.5)).clamp(0.0, 1.0);
    Ok(CsvDetection { encoding, delimiter, has_header, decimal_separator, columns, confidence })
}

/// Detect encoding and layout from raw bytes.
pub fn detect_csv(bytes: &[u8]) -> Result<CsvDetection> {
    let guess = detect_encoding(bytes);
    let text = decode(bytes, guess.encoding);
    detect_layout(&text, guess.encoding, guess.confidence)
}

/// Parse one numeric cell honouring the decimal separator. Blank and dash cells are absent.
pub(crate) fn parse_number(cell: &str, decimal_separator: char) -> std::result::Result<Option<f64>, String> {
    let cell = cell.trim().trim_matches('"');
    if cell.is_empty() || matches!(cell, "-" | "—" | "н/д" | "n/a" | "NA") {
        return Ok(None);
    }
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}'))
        .map(|c| if c == decimal_separator { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().map(Some).map_err(|_| format!("invalid number '{cell}'"))
}

/// Read a survey from raw bytes. Metadata is supplied by the caller.
pub fn read_csv(bytes: &[u8], options: &CsvImportOptions, metadata: WellMetadata) -> Result<IntervalData> {
    let guess = detect_encoding(bytes);
    let encoding = options.encoding.unwrap_or(guess.encoding);
    let text = decode(bytes, encoding);
    let detected = layout_with_delimiter(&text, encoding, guess.confidence, options.delimiter)?;

    let delimiter = detected.delimiter;
    let has_header = options.has_header.unwrap_or(detected.has_header);
    let decimal = options.decimal_separator.unwrap_or(detected.decimal_separator);
    let columns = options.columns.clone().unwrap_or(detected.columns);
    columns.validate()?;

    debug!(
        encoding = %encoding,
        delimiter = ?delimiter,
        has_header,
        decimal = ?decimal,
        confidence = detected.confidence,
        "CSV layout detected"
    );

    let delimiter_byte = u8::try_from(delimiter)
        .map_err(|_| PersistenceError::Format(format!("delimiter {delimiter:?} is not a single byte")))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut stations = Vec::new();
    let mut header_skipped = !has_header;
    for record in reader.records() {
        let record = record.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize);
            PersistenceError::parse(line, e.to_string())
        })?;
        let line = record.position().map(|p| p.line() as usize);
        if record.iter().all(str::is_empty) {
            continue;
        }
        if !header_skipped {
            header_skipped = true;
            continue;
        }
        if let Some(station) = parse_row(&record, &columns, decimal, line)? {
            stations.push(station);
        }
    }

    if stations.is_empty() {
        return Err(PersistenceError::EmptyResult("no measurement rows found".into()));
    }
    info!(stations = stations.len(), columns = %columns.summary(), "CSV survey imported");
    Ok(IntervalData::new(metadata, stations))
}

pub fn read_csv_file(path: &Path, options: &CsvImportOptions, metadata: WellMetadata) -> Result<IntervalData> {
    let bytes = std::fs::read(path).map_err(|e| PersistenceError::io(path, e))?;
    read_csv(&bytes, options, metadata)
}

/// One data row. Rows without depth or inclination are skipped.
fn parse_row(
    record: &csv::StringRecord,
    columns: &ColumnMap,
    decimal: char,
    line: Option<usize>,
) -> Result<Option<MeasurementStation>> {
    let number = |idx: Option<usize>| -> Result<Option<f64>> {
        match idx.and_then(|i| record.get(i)) {
            Some(cell) => parse_number(cell, decimal).map_err(|m| PersistenceError::parse(line, m)),
            None => Ok(None),
        }
    };

    let (Some(depth), Some(inclination)) = (number(columns.depth)?, number(columns.inclination)?) else {
        warn!(line = ?line, "Skipping row without depth or inclination");
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
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::encoding::encode;

    #[test]
    fn test_semicolon_with_decimal_comma() {
        let text = "Глубина;Зенит;Азимут\n0;0;\n100,5;1,25;45,5\n200;3,5;47\n";
        let det = detect_csv(text.as_bytes()).unwrap();
        assert_eq!(det.delimiter, ';');
        assert!(det.has_header);
        assert_eq!(det.decimal_separator, ',');

        let data = read_csv(text.as_bytes(), &CsvImportOptions::default(), WellMetadata::named("W1")).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.stations[0].magnetic_azimuth, None);
        assert!((data.stations[1].depth.0 - 100.5).abs() < 1e-12);
        assert!((data.stations[1].inclination.0 - 1.25).abs() < 1e-12);
        assert_eq!(data.metadata.well_name, "W1");
    }

    #[test]
    fn test_comma_delimited_english_header() {
        let text = "MD,INC,AZI,Marker\n0,0,0,\n30,1.5,120.25,KOP\n60,4.0,121.0,\n";
        let data = read_csv(text.as_bytes(), &CsvImportOptions::default(), WellMetadata::default()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.stations[1].marker.as_deref(), Some("KOP"));
        assert_eq!(data.stations[1].magnetic_azimuth, Some(Degrees(120.25)));
    }

    #[test]
    fn test_quoted_cells_do_not_split() {
        let text = "\"Depth, m\",\"Inclination, deg\",Marker\n0,0,\"wellhead, pad 7\"\n30,1.5,\"say \"\"KOP\"\"\"\n";
        let det = detect_csv(text.as_bytes()).unwrap();
        assert_eq!(det.delimiter, ',');
        assert!(det.has_header);
        assert_eq!(det.columns.marker, Some(2));
        let data = read_csv(text.as_bytes(), &CsvImportOptions::default(), WellMetadata::default()).unwrap();
        assert_eq!(data.stations[0].marker.as_deref(), Some("wellhead, pad 7"));
        assert_eq!(data.stations[1].marker.as_deref(), Some("say \"KOP\""));
        assert_eq!(split_cells(r#"1; "a; b" ;"c""d""#, ';'), vec!["1", "a; b", "c\"d"]);
    }

    #[test]
    fn test_headerless_tab_file() {
        let text = "0\t0\t0\n10\t0.5\t15\n20\t1.0\t16\n";
        let det = detect_csv(text.as_bytes()).unwrap();
        assert_eq!(det.delimiter, '\t');
        assert!(!det.has_header);
        let data = read_csv(text.as_bytes(), &CsvImportOptions::default(), WellMetadata::default()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.stations[2].magnetic_azimuth, Some(Degrees(16.0)));
    }

    #[test]
    fn test_windows_1251_input() {
        let text = "Глубина;Зенитный угол;Азимут истинный\n0;0;10\n50;2;11\n";
        let bytes = encode(text, TextEncoding::Windows1251);
        let det = detect_csv(&bytes).unwrap();
        assert_eq!(det.encoding, TextEncoding::Windows1251);
        let data = read_csv(&bytes, &CsvImportOptions::default(), WellMetadata::default()).unwrap();
        assert_eq!(data.stations[1].true_azimuth, Some(Degrees(11.0)));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = "depth;inc\n0;0\n10;abc\n";
        let err = read_csv(text.as_bytes(), &CsvImportOptions::default(), WellMetadata::default()).unwrap_err();
        match err {
            PersistenceError::Parse { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_columns_is_format_error() {
        let text = "foo;bar\nx;y\n";
        let err = read_csv(text.as_bytes(), &CsvImportOptions::default(), WellMetadata::default()).unwrap_err();
        assert!(matches!(err, PersistenceError::Format(_)));
    }

    #[test]
    fn test_override_delimiter() {
        let text = "depth|inc\n0|0\n10|1\n";
        let opts = CsvImportOptions { delimiter: Some('|'), ..CsvImportOptions::default() };
        let data = read_csv(text.as_bytes(), &opts, WellMetadata::default()).unwrap();
        assert_eq!(data.len(), 2);
    }
}
