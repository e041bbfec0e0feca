//! Procedure file loading
//!
//! A procedure file is read once and kept in three forms: the original
//! text (for format-preserving stamping), a JSON value (for schema
//! validation), and on demand the typed [`Procedure`].

use crate::error::{ProcedureError, ProcedureResult};
use crate::model::Procedure;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

/// A procedure file read from disk, not yet interpreted
#[derive(Debug, Clone)]
pub struct ProcedureSource {
    path: PathBuf,
    text: String,
    value: JsonValue,
}

impl ProcedureSource {
    /// Read and parse a procedure file
    ///
    /// # Errors
    /// - `ProcedureError::Io` if the file cannot be read
    /// - `ProcedureError::Syntax` if the YAML is malformed
    /// - `ProcedureError::EmptyDocument` if the root is not a mapping
    pub fn load(path: impl AsRef<Path>) -> ProcedureResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ProcedureError::io_error(path, e))?;
        Self::parse(path, text)
    }

    /// Parse procedure text attributed to `path`
    ///
    /// # Errors
    /// Same as [`ProcedureSource::load`] minus IO
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> ProcedureResult<Self> {
        let path = path.into();
        let text = text.into();

        let value: JsonValue =
            serde_yaml::from_str(&text).map_err(|e| ProcedureError::from_yaml(&path, &e))?;

        if !value.is_object() {
            return Err(ProcedureError::EmptyDocument { path });
        }

        tracing::trace!(path = %path.display(), "parsed procedure YAML");
        Ok(Self { path, text, value })
    }

    /// Source path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for messages
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Original file text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document as JSON
    #[inline]
    #[must_use]
    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    /// `procedure_name`, when the document has one
    #[must_use]
    pub fn procedure_name(&self) -> Option<&str> {
        self.value.get("procedure_name").and_then(JsonValue::as_str)
    }

    /// Interpret the document as a typed procedure
    ///
    /// # Errors
    /// Returns `ProcedureError::Model` if required fields are missing or mistyped
    pub fn to_procedure(&self) -> ProcedureResult<Procedure> {
        serde_json::from_value(self.value.clone())
            .map_err(|e| ProcedureError::model(&self.path, e.to_string()))
    }
}

/// Load and interpret a procedure file in one step
///
/// # Errors
/// Any error from [`ProcedureSource::load`] or [`ProcedureSource::to_procedure`]
pub fn load_procedure(path: impl AsRef<Path>) -> ProcedureResult<Procedure> {
    ProcedureSource::load(path)?.to_procedure()
}
