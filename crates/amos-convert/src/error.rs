//! Error types for catalog conversion

use amos_procedure::ProcedureError;
use std::path::PathBuf;

/// Conversion errors
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// IO error with path context
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog entry is not valid LOOBins YAML
    #[error("invalid LOOBins entry {path}: {source}")]
    Entry {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Template could not be parsed or written
    #[error(transparent)]
    Procedure(#[from] ProcedureError),

    /// Generated section could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for conversion
pub type ConvertResult<T> = Result<T, ConvertError>;
