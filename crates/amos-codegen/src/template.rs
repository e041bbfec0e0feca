//! Base shell template
//!
//! The base template is a complete POSIX script carrying the shared `core_`
//! functions. Procedure-specific text is spliced in at comment markers and
//! header tokens.

use crate::error::{CodegenError, CodegenResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Base script bundled with the crate
pub const EMBEDDED_BASE: &str = include_str!("../templates/base.sh");

/// Header tokens replaced with procedure metadata
pub const HEADER_TOKENS: [&str; 9] = [
    "[PROCEDURE_NAME]",
    "[TACTIC]",
    "[TTP_ID]",
    "[GUID]",
    "[INTENT]",
    "[AUTHOR]",
    "[CREATED]",
    "[UPDATED]",
    "[VERSION]",
];

/// Placeholder comment lines in the base template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    FlagVariables,
    GlobalVariables,
    InputProcessing,
    Functions,
    ArgumentParserOptions,
    HelpText,
    MainExecution,
}

impl Marker {
    /// Every marker, in substitution order
    pub const ALL: [Marker; 7] = [
        Marker::FlagVariables,
        Marker::GlobalVariables,
        Marker::InputProcessing,
        Marker::Functions,
        Marker::ArgumentParserOptions,
        Marker::HelpText,
        Marker::MainExecution,
    ];

    /// Marker text as it appears in the template
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Marker::FlagVariables => "# PLACEHOLDER_FLAG_VARIABLES",
            Marker::GlobalVariables => "# PLACEHOLDER_GLOBAL_VARIABLES",
            Marker::InputProcessing => "# PLACEHOLDER_INPUT_PROCESSING",
            Marker::Functions => "# PLACEHOLDER_FUNCTIONS",
            Marker::ArgumentParserOptions => "# PLACEHOLDER_ARGUMENT_PARSER_OPTIONS",
            Marker::HelpText => "# PLACEHOLDER_HELP_TEXT",
            Marker::MainExecution => "# PLACEHOLDER_MAIN_EXECUTION",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a template came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Embedded,
    File(PathBuf),
}

/// Loaded base template
#[derive(Debug, Clone)]
pub struct BaseTemplate {
    text: String,
    origin: TemplateOrigin,
}

impl BaseTemplate {
    /// The bundled base script
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            text: EMBEDDED_BASE.to_string(),
            origin: TemplateOrigin::Embedded,
        }
    }

    /// Template from in-memory text
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: TemplateOrigin::Embedded,
        }
    }

    /// Read a template file
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if the file cannot be read
    pub fn load(path: impl AsRef<Path>) -> CodegenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CodegenError::io_error(path, e))?;
        Ok(Self {
            text,
            origin: TemplateOrigin::File(path.to_path_buf()),
        })
    }

    /// Read `path` when it exists, else fall back to the bundled script
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if the file exists but cannot be read
    pub fn load_or_embedded(path: impl AsRef<Path>) -> CodegenResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "base template not found, using embedded copy");
            Ok(Self::embedded())
        }
    }

    /// Template text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Template origin
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &TemplateOrigin {
        &self.origin
    }

    /// Markers absent from the template
    #[must_use]
    pub fn missing_markers(&self) -> Vec<Marker> {
        Marker::ALL
            .into_iter()
            .filter(|m| !self.text.contains(m.as_str()))
            .collect()
    }
}

impl Default for BaseTemplate {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_template_is_complete() {
        let template = BaseTemplate::embedded();
        assert!(template.missing_markers().is_empty());
        for token in HEADER_TOKENS {
            assert!(template.text().contains(token), "missing {token}");
        }
        for line in ["PROJECT_ROOT=\"\"", "PROCEDURE_NAME=\"\"", "TTP_ID=\"\"", "TACTIC=\"\"", "CHECK_FDA=\"false\""] {
            assert!(template.text().contains(line), "missing {line}");
        }
    }

    #[test]
    fn reports_missing_markers() {
        let template = BaseTemplate::from_text("#!/bin/sh\n# PLACEHOLDER_FUNCTIONS\n");
        let missing = template.missing_markers();
        assert_eq!(missing.len(), 6);
        assert!(!missing.contains(&Marker::Functions));
    }

    #[test]
    fn falls_back_to_embedded() {
        let template = BaseTemplate::load_or_embedded("/nonexistent/amos/base.sh").unwrap();
        assert_eq!(template.origin(), &TemplateOrigin::Embedded);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.sh");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        let template = BaseTemplate::load_or_embedded(&path).unwrap();
        assert_eq!(template.origin(), &TemplateOrigin::File(path));
        assert_eq!(template.text(), "#!/bin/sh\n");
    }
}
