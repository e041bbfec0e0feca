//! Error types for the build pipeline

use amos_codegen::CodegenError;
use amos_procedure::{ProcedureError, ValidationReport};
use std::path::PathBuf;

use crate::check::CheckOutcome;

/// Build pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// IO error with path context
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `amos.toml` could not be parsed
    #[error("invalid project config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Procedure could not be loaded
    #[error(transparent)]
    Procedure(#[from] ProcedureError),

    /// Template could not be loaded
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// Procedure failed schema validation
    #[error("{path} failed validation with {} violation(s)", report.violations.len())]
    Validation {
        path: PathBuf,
        report: ValidationReport,
    },

    /// Generated script failed its shell checks and was removed
    #[error("{path} failed shell checks: {outcome}")]
    CheckFailed { path: PathBuf, outcome: CheckOutcome },

    /// Caldera ability serialization failed
    #[error("ability serialization failed: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl BuildError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for build operations
pub type BuildResult<T> = Result<T, BuildError>;
