//! Error types for procedure loading
//!
//! Covers:
//! - Reading procedure files
//! - YAML syntax failures (with source location when known)
//! - Typed model mismatches
//! - Schema compilation

use std::path::{Path, PathBuf};

/// Errors while loading or interpreting a procedure definition
#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    /// IO error reading a procedure or schema file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax error
    #[error("YAML syntax error in {}: {message}{}", display_name(.path), format_location(.line, .column))]
    Syntax {
        path: PathBuf,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// File parsed but holds no mapping
    #[error("{} does not contain a YAML mapping", display_name(.path))]
    EmptyDocument { path: PathBuf },

    /// Document does not fit the procedure model
    #[error("invalid procedure {}: {message}", display_name(.path))]
    Model { path: PathBuf, message: String },

    /// Schema could not be read or compiled
    #[error("schema error: {0}")]
    Schema(String),

    /// Malformed command-line option in an argument
    #[error(transparent)]
    Option(#[from] OptionError),
}

impl ProcedureError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create model error for path
    pub fn model(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Model {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Build a syntax error from a serde_yaml failure
    pub fn from_yaml(path: impl Into<PathBuf>, err: &serde_yaml::Error) -> Self {
        let location = err.location();
        Self::Syntax {
            path: path.into(),
            message: err.to_string(),
            line: location.as_ref().map(serde_yaml::Location::line),
            column: location.as_ref().map(serde_yaml::Location::column),
        }
    }
}

/// Errors parsing an argument `option` string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    /// Option string is blank
    #[error("option is empty")]
    Empty,

    /// No usable long form after stripping dashes
    #[error("option '{0}' has no long form")]
    MissingLongForm(String),
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn format_location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(l), Some(c)) => format!(" (line {l}, column {c})"),
        (Some(l), None) => format!(" (line {l})"),
        _ => String::new(),
    }
}

/// Result type alias for procedure operations
pub type ProcedureResult<T> = Result<T, ProcedureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display_includes_location() {
        let err = ProcedureError::Syntax {
            path: PathBuf::from("/tmp/config/system_info.yml"),
            message: "did not find expected key".to_string(),
            line: Some(4),
            column: Some(3),
        };
        assert_eq!(
            err.to_string(),
            "YAML syntax error in system_info.yml: did not find expected key (line 4, column 3)"
        );
    }

    #[test]
    fn model_error_uses_file_name() {
        let err = ProcedureError::model("/a/b/accounts.yml", "missing field `procedure`");
        assert_eq!(
            err.to_string(),
            "invalid procedure accounts.yml: missing field `procedure`"
        );
    }

    #[test]
    fn option_error_converts() {
        let err: ProcedureError = OptionError::Empty.into();
        assert!(matches!(err, ProcedureError::Option(OptionError::Empty)));
    }
}
