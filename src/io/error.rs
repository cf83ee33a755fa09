//! Typed errors for the persistence layer.

use std::path::PathBuf;

use crate::validation::ValidationIssue;

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Malformed source. `line` is 1-based when known.
    #[error("parse error{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse { line: Option<usize>, message: String },

    /// Well-formed document with the wrong schema.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// The file could not be identified or lacks required columns.
    #[error("unrecognised format: {0}")]
    Format(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("validation failed with {} issue(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("nothing to do: {0}")]
    EmptyResult(String),
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl PersistenceError {
    pub fn parse(line: Option<usize>, message: impl Into<String>) -> Self {
        Self::Parse { line, message: message.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_carries_line() {
        let e = PersistenceError::parse(Some(12), "bad number 'x'");
        assert_eq!(e.to_string(), "parse error at line 12: bad number 'x'");
        let e = PersistenceError::parse(None, "truncated");
        assert_eq!(e.to_string(), "parse error: truncated");
    }

    #[test]
    fn test_io_error_names_path() {
        let e = PersistenceError::io("/tmp/x.inclproj", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(e.to_string().contains("/tmp/x.inclproj"));
    }
}
