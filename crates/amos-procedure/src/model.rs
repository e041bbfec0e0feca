//! Procedure data model
//!
//! Typed view of a procedure YAML document. Optional header fields are kept
//! as `Option` and resolved through accessors carrying the build defaults,
//! so a rendered script never depends on which keys the author spelled out.

use crate::option::OptionSpec;
use crate::tactic::Tactic;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// YAML value meaning "generate a GUID at build time"
pub const GUID_PLACEHOLDER: &str = "$GUID";

/// YAML value meaning "stamp today's date at build time"
pub const UPDATED_PLACEHOLDER: &str = "$UPDATED";

const DEFAULT_TTP_ID: &str = "T1082";
const DEFAULT_TACTIC: &str = "Discovery";
const DEFAULT_INTENT: &str = "Security technique implementation";
const DEFAULT_AUTHOR: &str = "@darmado";
const DEFAULT_CREATED: &str = "2025-05-30";
const DEFAULT_VERSION: &str = "1.0.0";
const DEFAULT_TECHNIQUE_NAME: &str = "System Information Discovery";

/// A complete procedure definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    /// Script base name, also the `PROCEDURE_NAME` of the output
    pub procedure_name: String,
    #[serde(default)]
    pub ttp_id: Option<String>,
    #[serde(default)]
    pub tactic: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub technique_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub detection: Vec<Detection>,
    /// Arguments, globals and function bodies
    pub procedure: ProcedureBody,
}

impl Procedure {
    /// Procedure name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.procedure_name
    }

    /// Technique id, `T1082` when absent
    #[must_use]
    pub fn ttp_id(&self) -> &str {
        self.ttp_id.as_deref().unwrap_or(DEFAULT_TTP_ID)
    }

    /// Tactic name as written, `Discovery` when absent
    #[must_use]
    pub fn tactic_name(&self) -> &str {
        self.tactic.as_deref().unwrap_or(DEFAULT_TACTIC)
    }

    /// Parsed tactic
    #[must_use]
    pub fn tactic(&self) -> Tactic {
        Tactic::from_name(self.tactic_name())
    }

    /// Intent line for the script header
    #[must_use]
    pub fn intent(&self) -> &str {
        self.intent.as_deref().unwrap_or(DEFAULT_INTENT)
    }

    /// Author for the script header
    #[must_use]
    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or(DEFAULT_AUTHOR)
    }

    /// Creation date
    #[must_use]
    pub fn created(&self) -> &str {
        self.created.as_deref().unwrap_or(DEFAULT_CREATED)
    }

    /// Last-updated date, falling back to the creation date
    #[must_use]
    pub fn updated(&self) -> &str {
        self.updated.as_deref().unwrap_or_else(|| self.created())
    }

    /// Semantic version, `1.0.0` when absent
    #[must_use]
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// GUID as written (may be the placeholder)
    #[inline]
    #[must_use]
    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// Technique display name for integrations
    #[must_use]
    pub fn technique_name(&self) -> &str {
        self.technique_name.as_deref().unwrap_or(DEFAULT_TECHNIQUE_NAME)
    }

    /// Long description for integrations
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Execute {} with user-defined arguments", self.procedure_name))
    }

    /// Whether the GUID still needs stamping
    #[must_use]
    pub fn has_guid_placeholder(&self) -> bool {
        self.guid.as_deref() == Some(GUID_PLACEHOLDER)
    }

    /// Whether the updated date still needs stamping
    #[must_use]
    pub fn has_updated_placeholder(&self) -> bool {
        self.updated.as_deref() == Some(UPDATED_PLACEHOLDER)
    }

    /// Arguments in declaration order
    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.procedure.arguments
    }

    /// Global variables in declaration order
    #[inline]
    #[must_use]
    pub fn global_variables(&self) -> &[GlobalVariable] {
        &self.procedure.global_variable
    }

    /// Functions in declaration order
    #[inline]
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.procedure.functions
    }

    /// True when any argument accepts a value
    #[must_use]
    pub fn has_input_arguments(&self) -> bool {
        self.arguments().iter().any(Argument::takes_input)
    }

    /// True when any function asks for a Full Disk Access check
    #[must_use]
    pub fn requires_fda_check(&self) -> bool {
        self.functions().iter().any(|f| f.opsec.check_fda.enabled)
    }
}

/// The `procedure:` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureBody {
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub global_variable: Vec<GlobalVariable>,
    #[serde(default)]
    pub functions: Vec<Function>,
}

/// Declared type of an argument value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    String,
    Integer,
    /// Flags need no type; accepted so older files still load
    Boolean,
}

/// How an argument participates in the generated script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Takes a value and triggers functions
    Dual,
    /// Takes a value only
    InputOnly,
    /// Triggers functions only
    ActionOnly,
    /// Neither; contributes help text only
    Inert,
}

/// One command-line argument of the generated script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub option: OptionSpec,
    pub description: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub arg_type: Option<ArgumentType>,
    #[serde(default)]
    pub input_required: bool,
    #[serde(default)]
    pub execute_function: Vec<String>,
}

impl Argument {
    /// Whether the argument consumes a value
    #[must_use]
    pub fn takes_input(&self) -> bool {
        matches!(
            self.arg_type,
            Some(ArgumentType::String | ArgumentType::Integer)
        ) || self.input_required
    }

    /// Whether the argument triggers any function
    #[inline]
    #[must_use]
    pub fn has_execution(&self) -> bool {
        !self.execute_function.is_empty()
    }

    /// Classify the argument
    #[must_use]
    pub fn kind(&self) -> ArgumentKind {
        match (self.takes_input(), self.has_execution()) {
            (true, true) => ArgumentKind::Dual,
            (true, false) => ArgumentKind::InputOnly,
            (false, true) => ArgumentKind::ActionOnly,
            (false, false) => ArgumentKind::Inert,
        }
    }

    /// True for integer-typed arguments
    #[inline]
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.arg_type == Some(ArgumentType::Integer)
    }
}

/// Type of a global variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Integer,
    Boolean,
    Array,
}

/// A global shell variable declared by the procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    #[serde(default)]
    pub default_value: Option<JsonValue>,
    #[serde(default)]
    pub array_elements: Option<Vec<String>>,
}

impl GlobalVariable {
    /// Default value rendered as shell literal text (unquoted)
    #[must_use]
    pub fn default_literal(&self) -> String {
        match &self.default_value {
            None | Some(JsonValue::Null) => String::new(),
            Some(JsonValue::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// A shell function body carried by the procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(rename = "type", default = "default_function_type")]
    pub function_type: String,
    #[serde(default = "default_language")]
    pub language: Vec<String>,
    #[serde(default)]
    pub sudo_required: bool,
    #[serde(default)]
    pub opsec: Opsec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
}

fn default_function_type() -> String {
    "implementation".to_string()
}

fn default_language() -> Vec<String> {
    vec!["shell".to_string()]
}

/// Operational-security switches for a function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opsec {
    #[serde(default)]
    pub check_fda: CheckFda,
}

/// Full Disk Access check settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFda {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub exit_on_failure: bool,
}

/// External reference attached to a procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Target platform, written as a single name or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Platform {
    One(String),
    Many(Vec<String>),
}

impl Platform {
    /// Platform names in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Platform::One(name) => vec![name.as_str()],
            Platform::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Detection note attached to a procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub ioc: String,
    #[serde(default)]
    pub analysis: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn procedure(yaml: &str) -> Procedure {
        serde_yaml::from_str(yaml).unwrap()
    }

    const MINIMAL: &str = r#"
procedure_name: system_info
procedure:
  arguments:
    - option: "--basic"
      description: "Collect basic info"
      execute_function:
        - collect_basic
    - option: "--output-file"
      description: "Write results to file path"
      type: string
    - option: "-t|--timeout"
      description: "Timeout in seconds"
      type: integer
      execute_function: [apply_timeout]
    - option: "--quiet"
      description: "No functions"
  functions:
    - name: collect_basic
      code: |
        collect_basic() {
            echo ok
        }
"#;

    #[test]
    fn header_defaults() {
        let proc = procedure(MINIMAL);
        assert_eq!(proc.ttp_id(), "T1082");
        assert_eq!(proc.tactic(), Tactic::Discovery);
        assert_eq!(proc.author(), "@darmado");
        assert_eq!(proc.updated(), "2025-05-30");
        assert_eq!(proc.version(), "1.0.0");
        assert!(!proc.has_guid_placeholder());
    }

    #[test]
    fn argument_kinds() {
        let proc = procedure(MINIMAL);
        let kinds: Vec<_> = proc.arguments().iter().map(Argument::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArgumentKind::ActionOnly,
                ArgumentKind::InputOnly,
                ArgumentKind::Dual,
                ArgumentKind::Inert
            ]
        );
        assert!(proc.has_input_arguments());
    }

    #[test]
    fn function_defaults() {
        let proc = procedure(MINIMAL);
        let func = &proc.functions()[0];
        assert_eq!(func.function_type, "implementation");
        assert_eq!(func.language, vec!["shell".to_string()]);
        assert!(!func.sudo_required);
        assert!(!proc.requires_fda_check());
    }

    #[test]
    fn boolean_type_is_a_flag() {
        let arg: Argument = serde_yaml::from_str(
            "option: --verbose\ndescription: Verbose\ntype: boolean\n",
        )
        .unwrap();
        assert!(!arg.takes_input());
    }

    #[test]
    fn default_literal_formats_scalars() {
        let var: GlobalVariable =
            serde_yaml::from_str("name: RETRIES\ntype: integer\ndefault_value: 3\n").unwrap();
        assert_eq!(var.default_literal(), "3");

        let var: GlobalVariable =
            serde_yaml::from_str("name: ITEMS\ntype: array\n").unwrap();
        assert_eq!(var.default_literal(), "");
    }

    #[test]
    fn platform_accepts_scalar_or_list() {
        let proc = procedure(&format!("platform: macOS\n{MINIMAL}"));
        assert_eq!(proc.platform.unwrap().names(), vec!["macOS"]);

        let proc = procedure(&format!("platform: [macOS, linux]\n{MINIMAL}"));
        assert_eq!(proc.platform.unwrap().names(), vec!["macOS", "linux"]);
    }

    #[test]
    fn placeholders_detected() {
        let proc = procedure(&format!("guid: $GUID\nupdated: $UPDATED\n{MINIMAL}"));
        assert!(proc.has_guid_placeholder());
        assert!(proc.has_updated_placeholder());
    }
}
