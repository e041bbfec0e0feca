//! Error types for decryption

use std::path::PathBuf;

/// Decryption errors
#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    /// IO error with path context
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Method name not one of aes, gpg, xor, auto
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Key or passphrase is empty
    #[error("decryption key cannot be empty")]
    EmptyKey,

    /// Auto detection found no known format
    #[error("could not auto-detect encryption method")]
    UndetectableMethod,

    /// External tool is not installed
    #[error("{tool} not found, please install {tool}")]
    ToolMissing { tool: &'static str },

    /// External tool exited non-zero
    #[error("{tool} decryption failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },

    /// External tool could not be driven
    #[error("{tool} error: {source}")]
    ToolIo {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// External tool ran past the timeout
    #[error("{tool} timed out after {secs}s")]
    TimedOut { tool: &'static str, secs: u64 },

    /// XOR payload is not in the expected format
    #[error("invalid XOR format: {0}")]
    InvalidXor(String),

    /// XOR payload is not hex
    #[error("invalid hex data in XOR encrypted string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// XOR envelope is not base64
    #[error("invalid base64 data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Decrypted bytes are not text; usually a wrong key
    #[error("decrypted data is not valid UTF-8, check the key")]
    NotUtf8,

    /// JSON output envelope could not be parsed
    #[error("invalid JSON data: {0}")]
    Envelope(#[from] serde_json::Error),
}

impl DecryptError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for decryption
pub type DecryptResult<T> = Result<T, DecryptError>;
