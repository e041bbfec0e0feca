//! JSON-schema validation of procedure documents
//!
//! Build-time placeholders (`$GUID`, `$UPDATED`) are swapped for valid
//! stand-ins before validation so that freshly written procedures pass.
//! The document itself is never modified.

use crate::error::{ProcedureError, ProcedureResult};
use crate::model::{GUID_PLACEHOLDER, UPDATED_PLACEHOLDER};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{JSONSchema, ValidationError};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::Path;

/// Schema bundled with the crate
pub const EMBEDDED_SCHEMA: &str = include_str!("../schemas/procedure.schema.json");

const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";
const STAND_IN_DATE: &str = "2025-05-30";

/// Compiled procedure schema
pub struct ProcedureSchema {
    compiled: JSONSchema,
}

impl fmt::Debug for ProcedureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureSchema").finish_non_exhaustive()
    }
}

impl ProcedureSchema {
    /// Compile the bundled schema
    ///
    /// # Errors
    /// Returns `ProcedureError::Schema` if the bundled schema fails to compile
    pub fn embedded() -> ProcedureResult<Self> {
        Self::from_str(EMBEDDED_SCHEMA)
    }

    /// Read and compile a schema file
    ///
    /// # Errors
    /// - `ProcedureError::Io` if the file cannot be read
    /// - `ProcedureError::Schema` if it is not a valid schema
    pub fn from_path(path: impl AsRef<Path>) -> ProcedureResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ProcedureError::io_error(path, e))?;
        Self::from_str(&text)
    }

    /// Compile a schema from JSON text
    ///
    /// # Errors
    /// Returns `ProcedureError::Schema` on invalid JSON or schema
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> ProcedureResult<Self> {
        let schema: JsonValue = serde_json::from_str(text)
            .map_err(|e| ProcedureError::Schema(format!("invalid schema JSON: {e}")))?;
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| ProcedureError::Schema(format!("schema does not compile: {e}")))?;
        Ok(Self { compiled })
    }

    /// Validate a procedure document
    #[must_use]
    pub fn validate(&self, document: &JsonValue) -> ValidationReport {
        let instance = with_stand_ins(document);
        let violations = match self.compiled.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| SchemaViolation::from_error(&e)).collect(),
        };
        ValidationReport { violations }
    }
}

/// Replace stamping placeholders with values the schema accepts
fn with_stand_ins(document: &JsonValue) -> JsonValue {
    let mut instance = document.clone();
    if let Some(map) = instance.as_object_mut() {
        if map.get("guid").and_then(JsonValue::as_str) == Some(GUID_PLACEHOLDER) {
            map.insert("guid".to_string(), JsonValue::String(NIL_GUID.to_string()));
        }
        if map.get("updated").and_then(JsonValue::as_str) == Some(UPDATED_PLACEHOLDER) {
            map.insert("updated".to_string(), JsonValue::String(STAND_IN_DATE.to_string()));
        }
    }
    instance
}

/// Outcome of validating one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<SchemaViolation>,
}

impl ValidationReport {
    /// True when the document satisfies the schema
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Validator message
    pub message: String,
    /// Instance location, `procedure -> arguments -> 0 -> type`
    pub location: String,
    /// Suggested fix for common mistakes
    pub hint: Option<FixHint>,
}

impl SchemaViolation {
    fn from_error(error: &ValidationError<'_>) -> Self {
        let location = error
            .instance_path
            .to_string()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" -> ");

        let hint = match &error.kind {
            ValidationErrorKind::Enum { .. } if error.instance.as_str() == Some("boolean") => {
                Some(FixHint::RemoveBooleanType)
            }
            ValidationErrorKind::Required { property } => Some(FixHint::AddRequiredField(
                property
                    .as_str()
                    .map_or_else(|| property.to_string(), str::to_string),
            )),
            ValidationErrorKind::Pattern { .. } => Some(FixHint::CheckPattern),
            _ => None,
        };

        Self {
            message: error.to_string(),
            location,
            hint,
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.location)
        }
    }
}

/// Suggested remedy for a violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixHint {
    /// Flags must not declare `type: boolean`
    RemoveBooleanType,
    /// Named field is required
    AddRequiredField(String),
    /// Value fails a format pattern
    CheckPattern,
}

impl fmt::Display for FixHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixHint::RemoveBooleanType => f.write_str(
                "Remove 'type: boolean' from boolean arguments (type field is optional for flags)",
            ),
            FixHint::AddRequiredField(field) => {
                write!(f, "Add required field '{field}' to your YAML")
            }
            FixHint::CheckPattern => f.write_str("Check the format/pattern requirements for this field"),
        }
    }
}
