//! Project document: a set of wells with their sources, results and
//! display settings.
//!
//! A project is what gets saved to `*.inclproj` (see [`crate::io::project_file`]).
//! Wells are processed independently, so [`Project::process_all`] fans them
//! out over the rayon pool.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::defaults::{PROJECT_FORMAT_ID, PROJECT_FORMAT_VERSION};
use crate::engine::process_well_with_targets;
use crate::types::{IntervalData, ProcessingOptions, ProjectPoint, WellResult};
use crate::units::{Degrees, Meters};

// ============================================================================
// Colour
// ============================================================================

/// RGBA colour serialised as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour '{0}', expected #RRGGBB or #RRGGBBAA")]
pub struct ColorError(String);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Distinct colour for the n-th well of a project.
    pub fn palette(index: usize) -> Self {
        const PALETTE: [Color; 8] = [
            Color::rgb(0x1F, 0x77, 0xB4),
            Color::rgb(0xD6, 0x27, 0x28),
            Color::rgb(0x2C, 0xA0, 0x2C),
            Color::rgb(0xFF, 0x7F, 0x0E),
            Color::rgb(0x94, 0x67, 0xBD),
            Color::rgb(0x8C, 0x56, 0x4B),
            Color::rgb(0xE3, 0x77, 0xC2),
            Color::rgb(0x17, 0xBE, 0xCF),
        ];
        PALETTE[index % PALETTE.len()]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::palette(0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: if hex.len() == 8 { byte(6)? } else { 255 },
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

// ============================================================================
// Wells
// ============================================================================

/// Seismic shot point shown on plan views next to the wells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShotPoint {
    pub name: String,
    pub x: Meters,
    pub y: Meters,
    #[serde(default)]
    pub altitude: Option<Meters>,
}

/// One well inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WellEntry {
    pub id: Uuid,

    pub source: IntervalData,

    /// Last processing result; absent until the well is processed.
    #[serde(default)]
    pub result: Option<WellResult>,

    #[serde(default)]
    pub project_points: Vec<ProjectPoint>,

    #[serde(default)]
    pub color: Color,

    #[serde(default = "default_visible")]
    pub visible: bool,

    /// Reference well for pair analysis.
    #[serde(default)]
    pub is_base: bool,

    /// Slot on the pad.
    #[serde(default)]
    pub cluster_position: Option<u32>,

    #[serde(default)]
    pub shot_points: Vec<ShotPoint>,
}

fn default_visible() -> bool {
    true
}

impl WellEntry {
    pub fn new(source: IntervalData) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            result: None,
            project_points: Vec::new(),
            color: Color::default(),
            visible: true,
            is_base: false,
            cluster_position: None,
            shot_points: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.source.metadata.well_name
    }

    /// Run the engine and store the result; targets receive their actuals.
    pub fn process(&mut self, options: &ProcessingOptions) {
        let result = process_well_with_targets(&self.source, &self.project_points, options);
        self.project_points.clone_from(&result.project_points);
        self.result = Some(result);
    }
}

// ============================================================================
// Settings
// ============================================================================

/// 3-D view orientation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AxonometrySettings {
    #[serde(default = "default_rotation")]
    pub rotation: Degrees,
    #[serde(default = "default_elevation")]
    pub elevation: Degrees,
    #[serde(default = "default_scale")]
    pub vertical_scale: f64,
    #[serde(default = "default_true")]
    pub show_grid: bool,
}

/// Plan (top-down) view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlanSettings {
    #[serde(default = "default_grid_step")]
    pub grid_step: Meters,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_targets: bool,
    #[serde(default = "default_true")]
    pub show_shot_points: bool,
}

/// Vertical section view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VerticalSettings {
    /// Section plane azimuth; `None` follows the base well's final direction.
    #[serde(default)]
    pub projection_azimuth: Option<Degrees>,
    #[serde(default = "default_scale")]
    pub vertical_scale: f64,
    #[serde(default = "default_true")]
    pub show_grid: bool,
}

fn default_true() -> bool {
    true
}
fn default_rotation() -> Degrees {
    Degrees(45.0)
}
fn default_elevation() -> Degrees {
    Degrees(30.0)
}
fn default_scale() -> f64 {
    1.0
}
fn default_grid_step() -> Meters {
    Meters(100.0)
}

impl Default for AxonometrySettings {
    fn default() -> Self {
        Self {
            rotation: default_rotation(),
            elevation: default_elevation(),
            vertical_scale: default_scale(),
            show_grid: true,
        }
    }
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self { grid_step: default_grid_step(), show_grid: true, show_targets: true, show_shot_points: true }
    }
}

impl Default for VerticalSettings {
    fn default() -> Self {
        Self { projection_azimuth: None, vertical_scale: default_scale(), show_grid: true }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectSettings {
    #[serde(default)]
    pub axonometry: AxonometrySettings,
    #[serde(default)]
    pub plan: PlanSettings,
    #[serde(default)]
    pub vertical: VerticalSettings,
    #[serde(default)]
    pub processing: ProcessingOptions,
}

// ============================================================================
// Project
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Always `incline3d-project`; checked on load.
    pub format: String,
    pub version: String,
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub wells: Vec<WellEntry>,
    #[serde(default)]
    pub settings: ProjectSettings,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            format: PROJECT_FORMAT_ID.to_string(),
            version: PROJECT_FORMAT_VERSION.to_string(),
            metadata: ProjectMetadata {
                name: name.into(),
                description: String::new(),
                created_at: now,
                modified_at: now,
                author: String::new(),
            },
            wells: Vec::new(),
            settings: ProjectSettings::default(),
        }
    }

    /// Add a well with the next palette colour and return its id.
    pub fn add_well(&mut self, source: IntervalData) -> Uuid {
        let mut entry = WellEntry::new(source);
        entry.color = Color::palette(self.wells.len());
        let id = entry.id;
        self.wells.push(entry);
        self.touch();
        id
    }

    pub fn well(&self, id: Uuid) -> Option<&WellEntry> {
        self.wells.iter().find(|w| w.id == id)
    }

    pub fn well_mut(&mut self, id: Uuid) -> Option<&mut WellEntry> {
        self.wells.iter_mut().find(|w| w.id == id)
    }

    pub fn well_by_name(&self, name: &str) -> Option<&WellEntry> {
        self.wells.iter().find(|w| w.name() == name)
    }

    pub fn remove_well(&mut self, id: Uuid) -> Option<WellEntry> {
        let idx = self.wells.iter().position(|w| w.id == id)?;
        self.touch();
        Some(self.wells.remove(idx))
    }

    /// Mark one well as the base well; every other well loses the flag.
    pub fn set_base(&mut self, id: Uuid) -> bool {
        if self.well(id).is_none() {
            return false;
        }
        for w in &mut self.wells {
            w.is_base = w.id == id;
        }
        self.touch();
        true
    }

    pub fn base_well(&self) -> Option<&WellEntry> {
        self.wells.iter().find(|w| w.is_base)
    }

    /// Reprocess every well with the project's processing settings.
    pub fn process_all(&mut self) {
        let options = self.settings.processing;
        self.wells.par_iter_mut().for_each(|w| w.process(&options));
        self.touch();
    }

    pub fn touch(&mut self) {
        self.metadata.modified_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MeasurementStation, WellMetadata};

    fn survey(name: &str) -> IntervalData {
        IntervalData::new(
            WellMetadata::named(name),
            vec![
                MeasurementStation::new(0.0, 0.0),
                MeasurementStation::new(100.0, 5.0).with_magnetic(90.0),
                MeasurementStation::new(200.0, 10.0).with_magnetic(90.0),
            ],
        )
    }

    #[test]
    fn test_color_parsing() {
        let c: Color = "#1f77b4".parse().unwrap();
        assert_eq!(c, Color::rgb(0x1F, 0x77, 0xB4));
        assert_eq!(c.to_string(), "#1F77B4");

        let translucent: Color = "#FF000080".parse().unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_string(), "#FF000080");

        for bad in ["1F77B4", "#12345", "#GGGGGG", "#ЖЖЖ"] {
            assert!(bad.parse::<Color>().is_err(), "{bad} accepted");
        }
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#1F77B4\"");
    }

    #[test]
    fn test_base_well_is_exclusive() {
        let mut project = Project::new("Pad 7");
        let a = project.add_well(survey("A"));
        let b = project.add_well(survey("B"));
        assert_ne!(project.well(a).unwrap().color, project.well(b).unwrap().color);

        assert!(project.set_base(a));
        assert!(project.set_base(b));
        assert_eq!(project.base_well().unwrap().id, b);
        assert!(!project.well(a).unwrap().is_base);
        assert!(!project.set_base(Uuid::new_v4()));
    }

    #[test]
    fn test_process_all_fills_results_and_actuals() {
        let mut project = Project::new("Pad 7");
        let id = project.add_well(survey("A"));
        project.add_well(survey("B"));
        project
            .well_mut(id)
            .unwrap()
            .project_points
            .push(ProjectPoint::at_depth("T1", 90.0, 10.0, 150.0, 25.0));

        project.process_all();
        assert!(project.wells.iter().all(|w| w.result.as_ref().is_some_and(|r| r.points.len() == 3)));
        let entry = project.well(id).unwrap();
        assert!(entry.project_points[0].actual.is_some());
        assert_eq!(project.well_by_name("B").map(WellEntry::name), Some("B"));
    }

    #[test]
    fn test_remove_well() {
        let mut project = Project::new("P");
        let id = project.add_well(survey("A"));
        assert_eq!(project.remove_well(id).map(|w| w.id), Some(id));
        assert!(project.wells.is_empty());
        assert!(project.remove_well(id).is_none());
    }
}
