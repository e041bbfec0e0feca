//! LOOBins entry to procedure mapping
//!
//! The procedure template supplies key order and defaults; the entry
//! fills metadata, one argument and one function per use case, the
//! binary path global, resources and detections.

use crate::error::{ConvertError, ConvertResult};
use crate::loobin::{LoobinEntry, UseCase};
use amos_procedure::ProcedureDocument;
use serde::Serialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Procedure template bundled with the crate
pub const EMBEDDED_TEMPLATE: &str = include_str!("../templates/procedure.yml");

/// Maximum argument description length in characters
pub const DESCRIPTION_LIMIT: usize = 100;

/// Author used when the entry names none
pub const DEFAULT_AUTHOR: &str = "@darmado | https://x.com/darmad0";

#[derive(Serialize)]
struct ArgumentEntry {
    option: String,
    description: String,
    execute_function: Vec<String>,
}

#[derive(Serialize)]
struct GlobalEntry {
    name: &'static str,
    #[serde(rename = "type")]
    var_type: &'static str,
    default_value: String,
}

#[derive(Serialize)]
struct FunctionEntry {
    name: String,
    #[serde(rename = "type")]
    function_type: &'static str,
    language: Vec<&'static str>,
    sudo_required: bool,
    opsec: OpsecEntry,
    code: String,
}

#[derive(Serialize)]
struct OpsecEntry {
    check_fda: CheckFdaEntry,
}

#[derive(Serialize)]
struct CheckFdaEntry {
    enabled: bool,
    exit_on_failure: bool,
}

#[derive(Serialize)]
struct ResourceEntry {
    link: String,
    description: String,
}

#[derive(Serialize)]
struct DetectionEntry {
    ioc: String,
    analysis: String,
}

/// Parse the bundled procedure template
///
/// # Errors
/// Returns error if the bundled template is malformed
pub fn embedded_template() -> ConvertResult<ProcedureDocument> {
    Ok(ProcedureDocument::parse("procedure.yml", EMBEDDED_TEMPLATE)?)
}

/// Load a template file, or the bundled one when `path` does not exist
///
/// # Errors
/// Returns error if a present file cannot be read or parsed
pub fn load_template(path: impl AsRef<Path>) -> ConvertResult<ProcedureDocument> {
    let path = path.as_ref();
    if path.exists() {
        Ok(ProcedureDocument::load(path)?)
    } else {
        tracing::debug!(path = %path.display(), "procedure template not found, using embedded copy");
        embedded_template()
    }
}

/// Fill `template` from `loobin`, dating undated entries today
///
/// # Errors
/// Returns error if a generated section cannot be serialized
pub fn convert(template: ProcedureDocument, loobin: &LoobinEntry) -> ConvertResult<ProcedureDocument> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    convert_on(template, loobin, &today)
}

/// [`convert`] with an explicit date for undated entries
///
/// # Errors
/// Returns error if a generated section cannot be serialized
pub fn convert_on(mut template: ProcedureDocument, loobin: &LoobinEntry, today: &str) -> ConvertResult<ProcedureDocument> {
    let doc = &mut template;

    // Metadata
    doc.set_path("procedure_name", Value::from(loobin.name.to_lowercase()));
    let intent = loobin
        .short_description
        .clone()
        .unwrap_or_else(|| format!("Execute {} commands", loobin.name));
    doc.set_path("intent", Value::from(intent));
    doc.set_path("author", Value::from(loobin.author.as_deref().unwrap_or(DEFAULT_AUTHOR)));
    let created = loobin.created.as_deref().unwrap_or(today);
    doc.set_path("created", Value::from(created));
    doc.set_path("updated", Value::from(created));

    let arguments: Vec<ArgumentEntry> = loobin.example_use_cases.iter().map(argument).collect();
    doc.set_path("procedure.arguments", to_value(&arguments)?);

    let globals = [GlobalEntry {
        name: "BINARY_PATH",
        var_type: "string",
        default_value: loobin.binary_path(),
    }];
    doc.set_path("procedure.global_variable", to_value(&globals)?);

    let functions: Vec<FunctionEntry> = loobin.example_use_cases.iter().map(function).collect();
    doc.set_path("procedure.functions", to_value(&functions)?);

    if let Some(resources) = &loobin.resources {
        let resources: Vec<ResourceEntry> = resources
            .iter()
            .map(|r| ResourceEntry {
                link: r.url.clone(),
                description: r.name.clone(),
            })
            .collect();
        doc.set_path("resources", to_value(&resources)?);
    }

    if let Some(detections) = &loobin.detections {
        let detections: Vec<DetectionEntry> = detections
            .iter()
            .filter(|d| d.url.as_deref() != Some("N/A"))
            .map(|d| DetectionEntry {
                ioc: d.name.clone(),
                analysis: d.url.clone().unwrap_or_default(),
            })
            .collect();
        doc.set_path("detection", to_value(&detections)?);
    }

    tracing::debug!(
        name = %loobin.name,
        use_cases = loobin.example_use_cases.len(),
        "converted catalog entry"
    );
    Ok(template)
}

fn to_value<T: Serialize>(value: &T) -> ConvertResult<Value> {
    serde_yaml::to_value(value).map_err(ConvertError::from)
}

fn argument(case: &UseCase) -> ArgumentEntry {
    ArgumentEntry {
        option: case.option(),
        description: case.description.chars().take(DESCRIPTION_LIMIT).collect(),
        execute_function: vec![case.function_name()],
    }
}

fn function(case: &UseCase) -> FunctionEntry {
    let name = case.function_name();
    let code = format!(
        "{name}() {{\n    local result\n    result=$({} 2>&1)\n    $CMD_PRINTF \"RESULT|%s\\n\" \"$result\"\n    return 0\n}}",
        case.code
    );
    FunctionEntry {
        name,
        function_type: "main",
        language: vec!["shell"],
        sudo_required: false,
        opsec: OpsecEntry {
            check_fda: CheckFdaEntry {
                enabled: false,
                exit_on_failure: true,
            },
        },
        code,
    }
}

/// Output file for a converted entry: `<stem>_procedure.yml` in the
/// working directory
#[must_use]
pub fn output_path(loobin_path: impl AsRef<Path>) -> PathBuf {
    let stem = loobin_path
        .as_ref()
        .file_stem()
        .map_or_else(|| "loobin".into(), |s| s.to_string_lossy());
    PathBuf::from(format!("{stem}_procedure.yml"))
}

/// Write a converted document
///
/// # Errors
/// Returns error if serialization or the write fails
pub fn write_procedure(doc: &ProcedureDocument, path: impl AsRef<Path>) -> ConvertResult<()> {
    let path = path.as_ref();
    let text = doc.to_yaml_string()?;
    std::fs::write(path, text).map_err(|e| ConvertError::io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loobin::LoobinEntry;
    use pretty_assertions::assert_eq;

    fn converted() -> ProcedureDocument {
        let entry = LoobinEntry::parse("networksetup.yml", amos_test_utils::LOOBIN_YAML).unwrap();
        convert_on(embedded_template().unwrap(), &entry, "2026-01-01").unwrap()
    }

    #[test]
    fn metadata_is_filled() {
        let doc = converted();
        assert_eq!(doc.get_str("procedure_name"), Some("networksetup"));
        assert_eq!(doc.get_str("intent"), Some("Configure network settings."));
        assert_eq!(doc.get_str("author"), Some("Chris Campbell (@texasbe2trill)"));
        assert_eq!(doc.get_str("created"), Some("2023-05-22"));
        assert_eq!(doc.get_str("updated"), Some("2023-05-22"));
        assert_eq!(doc.get_str("guid"), Some("$GUID"));
    }

    #[test]
    fn use_cases_become_arguments_and_functions() {
        let doc = converted();
        let args = doc.get_path("procedure.arguments").unwrap().as_sequence().unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0]["option"].as_str(), Some("--enable-a-web-proxy"));
        assert_eq!(args[0]["description"].as_str().unwrap().chars().count(), DESCRIPTION_LIMIT);
        assert_eq!(args[1]["execute_function"][0].as_str(), Some("execute_list_network_services"));

        let funcs = doc.get_path("procedure.functions").unwrap().as_sequence().unwrap();
        assert_eq!(
            funcs[1]["code"].as_str(),
            Some("execute_list_network_services() {\n    local result\n    result=$(networksetup -listallnetworkservices 2>&1)\n    $CMD_PRINTF \"RESULT|%s\\n\" \"$result\"\n    return 0\n}")
        );
        assert_eq!(funcs[0]["opsec"]["check_fda"]["exit_on_failure"].as_bool(), Some(true));
    }

    #[test]
    fn detections_skip_unpublished() {
        let doc = converted();
        let detections = doc.get_path("detection").unwrap().as_sequence().unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0]["ioc"].as_str(), Some("Jamf Protect detection"));
        assert_eq!(doc.get_path("resources").unwrap()[0]["description"].as_str(), Some("networksetup man page"));
    }

    #[test]
    fn undated_entry_uses_given_day() {
        let entry = LoobinEntry::parse("foo.yml", "name: Foo\n").unwrap();
        let doc = convert_on(embedded_template().unwrap(), &entry, "2026-01-01").unwrap();
        assert_eq!(doc.get_str("created"), Some("2026-01-01"));
        assert_eq!(doc.get_str("intent"), Some("Execute Foo commands"));
        assert_eq!(doc.get_path("procedure.global_variable").unwrap()[0]["default_value"].as_str(), Some("/usr/bin/Foo"));
    }

    #[test]
    fn output_next_to_working_directory() {
        assert_eq!(output_path("/catalog/Networksetup.yml"), PathBuf::from("Networksetup_procedure.yml"));
    }
}
