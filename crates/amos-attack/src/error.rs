//! Error types for ATT&CK queries

use std::path::PathBuf;

/// ATT&CK dataset and coverage errors
#[derive(Debug, thiserror::Error)]
pub enum AttackError {
    /// IO error with path context
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset is not a STIX bundle
    #[error("invalid STIX bundle: {0}")]
    Bundle(#[from] serde_json::Error),

    /// Coverage overlay could not be parsed
    #[error("invalid coverage file {path}: {source}")]
    Coverage {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl AttackError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for ATT&CK operations
pub type AttackResult<T> = Result<T, AttackError>;
