//! Script rendering
//!
//! Rendering runs in two passes: header tokens and configuration lines are
//! filled on the bare template first, then markers are swapped for the
//! generated fragments. User code inside fragments is never rewritten.

use crate::fragments;
use crate::template::{BaseTemplate, Marker};
use amos_procedure::Procedure;

/// Per-build overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Value for `PROJECT_ROOT=""`, left empty when `None`
    pub project_root: Option<String>,
    /// Version written to the header instead of the YAML value
    pub version: Option<String>,
    /// Updated date written to the header instead of the YAML value
    pub updated: Option<String>,
}

impl RenderOptions {
    /// Options with a project root set
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<String>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Override the header version
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Override the header updated date
    #[must_use]
    pub fn with_updated(mut self, updated: impl Into<String>) -> Self {
        self.updated = Some(updated.into());
        self
    }
}

/// Expands procedures into standalone scripts
#[derive(Debug, Clone, Default)]
pub struct ScriptRenderer {
    template: BaseTemplate,
}

impl ScriptRenderer {
    /// Renderer over `template`
    #[must_use]
    pub fn new(template: BaseTemplate) -> Self {
        Self { template }
    }

    /// Template in use
    #[inline]
    #[must_use]
    pub fn template(&self) -> &BaseTemplate {
        &self.template
    }

    /// Render a complete script
    #[must_use]
    pub fn render(&self, procedure: &Procedure, options: &RenderOptions) -> String {
        let name = procedure.name();
        let mut content = self.template.text().to_string();

        // Header
        let guid = match procedure.guid() {
            Some(guid) if !procedure.has_guid_placeholder() => guid.to_string(),
            _ => "[GUID]".to_string(),
        };
        let updated = match &options.updated {
            Some(updated) => updated.clone(),
            None if procedure.has_updated_placeholder() => "[UPDATED]".to_string(),
            None => procedure.updated().to_string(),
        };
        let version = options
            .version
            .clone()
            .unwrap_or_else(|| procedure.version().to_string());

        for (token, value) in [
            ("[PROCEDURE_NAME]", name.to_string()),
            ("[TACTIC]", procedure.tactic_name().to_string()),
            ("[TTP_ID]", procedure.ttp_id().to_string()),
            ("[GUID]", guid),
            ("[INTENT]", procedure.intent().to_string()),
            ("[AUTHOR]", procedure.author().to_string()),
            ("[CREATED]", procedure.created().to_string()),
            ("[UPDATED]", updated),
            ("[VERSION]", version),
        ] {
            content = content.replace(token, &value);
        }

        // Configuration
        if let Some(root) = &options.project_root {
            content = content.replace("PROJECT_ROOT=\"\"", &format!("PROJECT_ROOT=\"{root}\""));
        }
        content = content.replace("PROCEDURE_NAME=\"\"", &format!("PROCEDURE_NAME=\"{name}\""));
        content = content.replace("TTP_ID=\"\"", &format!("TTP_ID=\"{}\"", procedure.ttp_id()));
        content = content.replace("TACTIC=\"\"", &format!("TACTIC=\"{}\"", procedure.tactic_name()));
        if procedure.requires_fda_check() {
            content = content.replace("CHECK_FDA=\"false\"", "CHECK_FDA=\"true\"");
        }

        // Fragments
        let auto = fragments::auto_variables(procedure);
        if !content.contains(Marker::GlobalVariables.as_str()) {
            tracing::debug!("global variable marker missing, injecting after PROCEDURE_NAME");
            let line = format!("PROCEDURE_NAME=\"{name}\"");
            content = content.replacen(&line, &format!("{line}{auto}"), 1);
        }

        for marker in Marker::ALL {
            let fragment = match marker {
                Marker::FlagVariables => fragments::flag_variables(procedure),
                Marker::GlobalVariables => fragments::global_variables(procedure) + &auto,
                Marker::InputProcessing => fragments::input_processing(procedure),
                Marker::Functions => fragments::functions(procedure),
                Marker::ArgumentParserOptions => fragments::argument_parser(procedure),
                Marker::HelpText => fragments::help_text(procedure),
                Marker::MainExecution => fragments::main_execution(procedure),
            };
            content = content.replace(marker.as_str(), &fragment);
        }

        tracing::trace!(procedure = name, bytes = content.len(), "rendered script");
        content
    }
}
