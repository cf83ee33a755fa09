//! Tabular export of processed trajectories.
//!
//! Field selection is an explicit ordered list. Delimiter, decimal separator,
//! precision, header style and output encoding are all configurable; every
//! writer goes through [`write_atomic`](super::atomic::write_atomic).

use std::path::Path;

use csv::{Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::atomic::write_atomic;
use super::encoding::{encode, TextEncoding};
use super::error::{PersistenceError, Result};
use crate::config::defaults;
use crate::types::{ProcessedPoint, WellResult};

/// How column headers are written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStyle {
    /// Title with unit, e.g. `Depth, m`.
    #[default]
    Full,
    /// Short mnemonic, e.g. `MD`.
    Mnemonic,
    None,
}

/// One exportable column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExportField {
    Depth,
    Inclination,
    MagneticAzimuth,
    TrueAzimuth,
    ComputedAzimuth,
    ToolFace,
    Rop,
    Marker,
    X,
    Y,
    Tvd,
    AbsoluteAltitude,
    Shift,
    DirectionAngle,
    Elongation,
    Intensity10m,
    IntensityL,
    SigmaX,
    SigmaY,
    SigmaTvd,
    SigmaIntensity,
}

/// Cell content before formatting.
enum Cell<'a> {
    Number(f64),
    Text(&'a str),
    Empty,
}

impl ExportField {
    pub const DEFAULT_SET: [Self; 12] = [
        Self::Depth,
        Self::Inclination,
        Self::MagneticAzimuth,
        Self::TrueAzimuth,
        Self::X,
        Self::Y,
        Self::Tvd,
        Self::AbsoluteAltitude,
        Self::Shift,
        Self::DirectionAngle,
        Self::Intensity10m,
        Self::IntensityL,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Depth => "MD",
            Self::Inclination => "INC",
            Self::MagneticAzimuth => "AZIM",
            Self::TrueAzimuth => "AZIT",
            Self::ComputedAzimuth => "AZW",
            Self::ToolFace => "TF",
            Self::Rop => "ROP",
            Self::Marker => "MARKER",
            Self::X => "NORTH",
            Self::Y => "EAST",
            Self::Tvd => "TVD",
            Self::AbsoluteAltitude => "ABSG",
            Self::Shift => "SHIFT",
            Self::DirectionAngle => "DIR",
            Self::Elongation => "ELONG",
            Self::Intensity10m => "DLS10",
            Self::IntensityL => "DLSL",
            Self::SigmaX => "SX",
            Self::SigmaY => "SY",
            Self::SigmaTvd => "STVD",
            Self::SigmaIntensity => "SDLS",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Depth => "Depth, m",
            Self::Inclination => "Inclination, deg",
            Self::MagneticAzimuth => "Magnetic azimuth, deg",
            Self::TrueAzimuth => "True azimuth, deg",
            Self::ComputedAzimuth => "Working azimuth, deg",
            Self::ToolFace => "Tool face, deg",
            Self::Rop => "ROP, m/h",
            Self::Marker => "Marker",
            Self::X => "North, m",
            Self::Y => "East, m",
            Self::Tvd => "TVD, m",
            Self::AbsoluteAltitude => "Absolute altitude, m",
            Self::Shift => "Shift, m",
            Self::DirectionAngle => "Direction, deg",
            Self::Elongation => "Elongation, m",
            Self::Intensity10m => "Intensity, deg/10m",
            Self::IntensityL => "Intensity, deg/L",
            Self::SigmaX => "Sigma north, m",
            Self::SigmaY => "Sigma east, m",
            Self::SigmaTvd => "Sigma TVD, m",
            Self::SigmaIntensity => "Sigma intensity, deg/10m",
        }
    }

    fn cell(self, p: &ProcessedPoint) -> Cell<'_> {
        let opt = |v: Option<f64>| v.map_or(Cell::Empty, Cell::Number);
        match self {
            Self::Depth => Cell::Number(p.depth.0),
            Self::Inclination => Cell::Number(p.inclination.0),
            Self::MagneticAzimuth => opt(p.magnetic_azimuth.map(|a| a.0)),
            Self::TrueAzimuth => opt(p.true_azimuth.map(|a| a.0)),
            Self::ComputedAzimuth => opt(p.computed_azimuth.map(|a| a.0)),
            Self::ToolFace => opt(p.tool_face.map(|a| a.0)),
            Self::Rop => opt(p.rop),
            Self::Marker => p.marker.as_deref().map_or(Cell::Empty, Cell::Text),
            Self::X => Cell::Number(p.x.0),
            Self::Y => Cell::Number(p.y.0),
            Self::Tvd => Cell::Number(p.tvd.0),
            Self::AbsoluteAltitude => Cell::Number(p.absolute_altitude.0),
            Self::Shift => Cell::Number(p.shift.0),
            Self::DirectionAngle => Cell::Number(p.direction_angle.0),
            Self::Elongation => Cell::Number(p.elongation.0),
            Self::Intensity10m => Cell::Number(p.intensity_10m),
            Self::IntensityL => Cell::Number(p.intensity_l),
            Self::SigmaX => Cell::Number(p.sigma_x.0),
            Self::SigmaY => Cell::Number(p.sigma_y.0),
            Self::SigmaTvd => Cell::Number(p.sigma_tvd.0),
            Self::SigmaIntensity => Cell::Number(p.sigma_intensity),
        }
    }
}

/// Knobs shared by every writer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportOptions {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    #[serde(default)]
    pub encoding: TextEncoding,

    /// Digits after the decimal separator.
    #[serde(default = "default_precision")]
    pub precision: usize,

    #[serde(default)]
    pub header: HeaderStyle,

    #[serde(default = "default_fields")]
    pub fields: Vec<ExportField>,
}

fn default_delimiter() -> char {
    ';'
}
fn default_decimal_separator() -> char {
    '.'
}
fn default_precision() -> usize {
    defaults::EXPORT_PRECISION
}
fn default_fields() -> Vec<ExportField> {
    ExportField::DEFAULT_SET.to_vec()
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            decimal_separator: default_decimal_separator(),
            encoding: TextEncoding::default(),
            precision: default_precision(),
            header: HeaderStyle::default(),
            fields: default_fields(),
        }
    }
}

impl ExportOptions {
    /// Format a number with the configured precision and decimal separator.
    pub fn format_number(&self, value: f64) -> String {
        let text = format!("{value:.prec$}", prec = self.precision);
        // Avoid "-0.00" for values that round to zero
        let text = if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
            text.trim_start_matches('-').to_string()
        } else {
            text
        };
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.delimiter == self.decimal_separator {
            return Err(PersistenceError::Format(format!(
                "delimiter and decimal separator are both {:?}",
                self.delimiter
            )));
        }
        if matches!(self.delimiter, '"' | '\r' | '\n') {
            return Err(PersistenceError::Format(format!("{:?} cannot be a delimiter", self.delimiter)));
        }
        if self.fields.is_empty() {
            return Err(PersistenceError::Format("no export fields selected".into()));
        }
        Ok(())
    }
}

/// Render the point table as delimited text.
///
/// Cells holding the delimiter or a quote are quoted; line breaks inside text
/// cells become spaces.
pub fn format_csv(result: &WellResult, options: &ExportOptions) -> Result<String> {
    options.check()?;
    let delimiter = u8::try_from(options.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| PersistenceError::Format(format!("delimiter {:?} is not ASCII", options.delimiter)))?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    let csv_error = |e: csv::Error| PersistenceError::Format(format!("CSV write failed: {e}"));

    let header: Option<Vec<&str>> = match options.header {
        HeaderStyle::Full => Some(options.fields.iter().map(|f| f.title()).collect()),
        HeaderStyle::Mnemonic => Some(options.fields.iter().map(|f| f.mnemonic()).collect()),
        HeaderStyle::None => None,
    };
    if let Some(cells) = header {
        writer.write_record(&cells).map_err(csv_error)?;
    }

    for point in &result.points {
        let cells = options.fields.iter().map(|f| match f.cell(point) {
            Cell::Number(v) => options.format_number(v),
            Cell::Text(s) => s.replace(['\r', '\n'], " "),
            Cell::Empty => String::new(),
        });
        writer.write_record(cells).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PersistenceError::Format(format!("CSV write failed: {}", e.error())))?;
    String::from_utf8(bytes).map_err(|e| PersistenceError::Format(format!("CSV output is not UTF-8: {e}")))
}

/// Write the point table atomically in the configured encoding.
pub fn export_csv(path: &Path, result: &WellResult, options: &ExportOptions) -> Result<()> {
    if result.is_empty() {
        return Err(PersistenceError::EmptyResult(format!(
            "well '{}' has no processed points",
            result.metadata.well_name
        )));
    }
    let text = format_csv(result, options)?;
    write_atomic(path, &encode(&text, options.encoding))?;
    info!(path = %path.display(), rows = result.points.len(), "CSV export written");
    Ok(())
}
