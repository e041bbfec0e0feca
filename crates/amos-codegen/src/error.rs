//! Error types for script generation

use std::path::PathBuf;

/// Errors while preparing a script render
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// IO error reading a template
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for codegen operations
pub type CodegenResult<T> = Result<T, CodegenError>;
