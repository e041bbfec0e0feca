//! Error types for documentation sync

use std::path::PathBuf;

/// Documentation sync errors
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// IO error with path context
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Base template defines no `core_` functions
    #[error("no core functions found in base template")]
    NoFunctions,
}

impl DocsError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for documentation operations
pub type DocsResult<T> = Result<T, DocsError>;
