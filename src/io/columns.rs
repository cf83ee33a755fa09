//! Column role resolution for tabular survey files.
//!
//! Header names are case-folded, stripped of unit suffixes such as `(m)` or
//! `[deg]`, and looked up in alias tables that cover English mnemonics, LAS
//! curve names and the Russian headers of legacy exports. The first column
//! matching a role wins.

use super::error::{PersistenceError, Result};

/// What a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Depth,
    Inclination,
    MagneticAzimuth,
    TrueAzimuth,
    ToolFace,
    Rop,
    Marker,
}

const DEPTH_ALIASES: &[&str] = &[
    "depth", "md", "dept", "dep", "measured depth", "глубина", "глуб", "глубина по стволу",
];
const INCLINATION_ALIASES: &[&str] = &[
    "inc", "incl", "inclination", "angle", "zenith", "devi", "зенит", "зенитный угол", "угол",
    "инклинация",
];
const MAGNETIC_AZIMUTH_ALIASES: &[&str] = &[
    "azim", "azi", "az", "azm", "hazi", "azimuth", "magnetic azimuth", "azimuth magnetic", "азимут",
    "азимут магнитный", "магнитный азимут", "азимут маг",
];
const TRUE_AZIMUTH_ALIASES: &[&str] = &[
    "azit", "tazi", "dazi", "true azimuth", "azimuth true", "geographic azimuth", "азимут истинный",
    "истинный азимут", "азимут ист", "азимут географический", "дирекционный угол",
];
const TOOL_FACE_ALIASES: &[&str] = &[
    "tf", "toolface", "tool face", "gtf", "mtf", "отклонитель", "положение отклонителя",
];
const ROP_ALIASES: &[&str] = &["rop", "скорость", "мех скорость", "скорость проходки"];
const MARKER_ALIASES: &[&str] = &["marker", "mark", "comment", "метка", "маркер", "примечание"];

/// Case-fold and strip unit decorations from a header cell.
pub fn normalize_header(name: &str) -> String {
    let cut = name
        .find(|c| matches!(c, '(' | '[' | ','))
        .map_or(name, |i| &name[..i]);
    let cleaned: String = cut
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.' | '°' | '/') { ' ' } else { c })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Role of a single header cell, if recognised.
pub fn resolve_role(name: &str) -> Option<ColumnRole> {
    let key = normalize_header(name);
    let tables: [(ColumnRole, &[&str]); 7] = [
        (ColumnRole::Depth, DEPTH_ALIASES),
        (ColumnRole::Inclination, INCLINATION_ALIASES),
        (ColumnRole::TrueAzimuth, TRUE_AZIMUTH_ALIASES),
        (ColumnRole::MagneticAzimuth, MAGNETIC_AZIMUTH_ALIASES),
        (ColumnRole::ToolFace, TOOL_FACE_ALIASES),
        (ColumnRole::Rop, ROP_ALIASES),
        (ColumnRole::Marker, MARKER_ALIASES),
    ];
    if let Some((role, _)) = tables.iter().find(|(_, aliases)| aliases.contains(&key.as_str())) {
        return Some(*role);
    }

    // Looser forms such as "Азимут истинный, град" or "Inclination deg"
    let first = key.split(' ').next().unwrap_or_default();
    if key.starts_with("азимут") || first.starts_with("azim") {
        let is_true = key.contains("ист") || key.contains("true") || key.contains("геогр") || key.contains("grid");
        return Some(if is_true { ColumnRole::TrueAzimuth } else { ColumnRole::MagneticAzimuth });
    }
    match first {
        f if f.starts_with("зенит") || f.starts_with("incl") => Some(ColumnRole::Inclination),
        f if f.starts_with("глубин") || f == "depth" => Some(ColumnRole::Depth),
        _ => None,
    }
}

/// Column indices by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub depth: Option<usize>,
    pub inclination: Option<usize>,
    pub magnetic_azimuth: Option<usize>,
    pub true_azimuth: Option<usize>,
    pub tool_face: Option<usize>,
    pub rop: Option<usize>,
    pub marker: Option<usize>,
}

impl ColumnMap {
    /// Map header cells to roles; the first match per role wins.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut map = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            let Some(role) = resolve_role(header.as_ref()) else {
                continue;
            };
            let slot = map.slot_mut(role);
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    /// Fixed layout for header-less files: depth, inclination, azimuth, then true azimuth.
    pub fn positional(column_count: usize) -> Self {
        let at = |i: usize| (i < column_count).then_some(i);
        Self {
            depth: at(0),
            inclination: at(1),
            magnetic_azimuth: at(2),
            true_azimuth: at(3),
            ..Self::default()
        }
    }

    fn slot_mut(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Depth => &mut self.depth,
            ColumnRole::Inclination => &mut self.inclination,
            ColumnRole::MagneticAzimuth => &mut self.magnetic_azimuth,
            ColumnRole::TrueAzimuth => &mut self.true_azimuth,
            ColumnRole::ToolFace => &mut self.tool_face,
            ColumnRole::Rop => &mut self.rop,
            ColumnRole::Marker => &mut self.marker,
        }
    }

    /// Depth and inclination are required.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.depth.is_none() {
            missing.push("depth");
        }
        if self.inclination.is_none() {
            missing.push("inclination");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PersistenceError::Format(format!("missing required column(s): {}", missing.join(", "))))
        }
    }

    /// Share of the four survey roles that were found.
    pub fn coverage(&self) -> f64 {
        let found = [self.depth, self.inclination, self.magnetic_azimuth, self.true_azimuth]
            .iter()
            .filter(|c| c.is_some())
            .count();
        found as f64 / 4.0
    }

    /// Report which columns were found
    pub fn summary(&self) -> String {
        let mut found: Vec<&str> = Vec::new();
        let mut missing: Vec<&str> = Vec::new();

        macro_rules! check_col {
            ($name:expr, $field:expr) => {
                if $field.is_some() { found.push($name); } else { missing.push($name); }
            };
        }

        check_col!("depth", self.depth);
        check_col!("inclination", self.inclination);
        check_col!("magnetic_azimuth", self.magnetic_azimuth);
        check_col!("true_azimuth", self.true_azimuth);
        check_col!("tool_face", self.tool_face);
        check_col!("rop", self.rop);
        check_col!("marker", self.marker);

        format!("found [{}], missing [{}]", found.join(", "), missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_and_las_aliases() {
        let map = ColumnMap::from_headers(&["MD (m)", "INCL", "AZIM", "AZIT", "TF", "Marker"]);
        assert_eq!(map.depth, Some(0));
        assert_eq!(map.inclination, Some(1));
        assert_eq!(map.magnetic_azimuth, Some(2));
        assert_eq!(map.true_azimuth, Some(3));
        assert_eq!(map.tool_face, Some(4));
        assert_eq!(map.marker, Some(5));
        assert!(map.validate().is_ok());
        assert!((map.coverage() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_russian_headers() {
        let map = ColumnMap::from_headers(&["Глубина, м", "Зенитный угол, град", "Азимут магнитный, град", "Азимут истинный"]);
        assert_eq!(map.depth, Some(0));
        assert_eq!(map.inclination, Some(1));
        assert_eq!(map.magnetic_azimuth, Some(2));
        assert_eq!(map.true_azimuth, Some(3));
    }

    #[test]
    fn test_first_match_wins() {
        let map = ColumnMap::from_headers(&["Depth", "MD", "Angle", "Inc"]);
        assert_eq!(map.depth, Some(0));
        assert_eq!(map.inclination, Some(2));
    }

    #[test]
    fn test_missing_required_columns() {
        let map = ColumnMap::from_headers(&["Azimuth", "Comment"]);
        let err = map.validate().unwrap_err();
        assert!(err.to_string().contains("depth"));
        assert!(map.summary().contains("missing [depth, inclination"));
    }

    #[test]
    fn test_positional_layout() {
        let map = ColumnMap::positional(3);
        assert_eq!(map.magnetic_azimuth, Some(2));
        assert_eq!(map.true_azimuth, None);
    }
}
