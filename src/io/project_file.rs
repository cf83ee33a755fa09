//! `*.inclproj` project files (UTF-8 JSON).
//!
//! The top-level `format` field must equal `incline3d-project`; anything else
//! is a schema mismatch. `version` is only compared for a warning. Unknown
//! fields are ignored and missing optional fields take their defaults.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use super::atomic::write_atomic;
use super::error::{PersistenceError, Result};
use crate::config::defaults::{PROJECT_FORMAT_ID, PROJECT_FORMAT_VERSION};
use crate::project::Project;

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or_default()
}

/// Serialise a project to pretty JSON.
pub fn project_to_json(project: &Project) -> Result<String> {
    serde_json::to_string_pretty(project).map_err(|e| PersistenceError::Format(format!("cannot serialise project: {e}")))
}

/// Parse a project document, enforcing the format gate.
pub fn project_from_json(text: &str) -> Result<Project> {
    let value: Value = serde_json::from_str(text).map_err(|e| PersistenceError::parse(Some(e.line()), e.to_string()))?;

    match value.get("format").and_then(Value::as_str) {
        Some(PROJECT_FORMAT_ID) => {}
        Some(other) => {
            return Err(PersistenceError::Schema(format!("expected format '{PROJECT_FORMAT_ID}', found '{other}'")));
        }
        None => return Err(PersistenceError::Schema("missing 'format' field".into())),
    }

    if let Some(version) = value.get("version").and_then(Value::as_str) {
        if major(version) != major(PROJECT_FORMAT_VERSION) {
            warn!(version, supported = PROJECT_FORMAT_VERSION, "Project file version differs from this build");
        }
    }

    serde_json::from_value(value).map_err(|e| PersistenceError::Schema(e.to_string()))
}

/// Save atomically; the previous file survives any failure.
pub fn save_project(path: &Path, project: &Project) -> Result<()> {
    let json = project_to_json(project)?;
    write_atomic(path, json.as_bytes())?;
    info!(path = %path.display(), wells = project.wells.len(), "Project saved");
    Ok(())
}

pub fn load_project(path: &Path) -> Result<Project> {
    let text = std::fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    let project = project_from_json(&text)?;
    info!(
        path = %path.display(),
        name = %project.metadata.name,
        wells = project.wells.len(),
        "Project loaded"
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_gate() {
        let mut doc: Value = serde_json::from_str(&project_to_json(&Project::new("P")).unwrap()).unwrap();
        doc["format"] = Value::from("other-project");
        assert!(matches!(project_from_json(&doc.to_string()), Err(PersistenceError::Schema(_))));

        doc.as_object_mut().unwrap().remove("format");
        assert!(matches!(project_from_json(&doc.to_string()), Err(PersistenceError::Schema(_))));
    }

    #[test]
    fn test_parse_error_has_line() {
        match project_from_json("{\n  \"format\": \"incline3d-project\",\n  oops\n}") {
            Err(PersistenceError::Parse { line, .. }) => assert_eq!(line, Some(3)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_fields_and_missing_optionals() {
        let text = r#"{
            "format": "incline3d-project",
            "version": "2.3.0",
            "metadata": {"name": "Old", "created_at": "2023-01-01T00:00:00Z", "modified_at": "2023-01-02T00:00:00Z"},
            "future_field": [1, 2, 3]
        }"#;
        let project = project_from_json(text).unwrap();
        assert_eq!(project.metadata.name, "Old");
        assert!(project.wells.is_empty());
        assert_eq!(project.settings, crate::project::ProjectSettings::default());
    }
}
