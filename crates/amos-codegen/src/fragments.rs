//! Shell fragment generators
//!
//! Each generator is a single pass over the procedure that yields the text
//! substituted for one base-template marker. Output lines are joined with
//! `\n` and carry no trailing newline unless noted.

use amos_procedure::{Argument, ArgumentKind, Procedure, VariableType};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `$("$CMD_X" args)` command substitutions
static COMMAND_SUBSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\$\(\s*"\$CMD_([A-Z_]+)"\s*([^)]*)\)"#).expect("command substitution regex is valid")
});

/// Width of the option column in generated help text
pub const HELP_COLUMN_WIDTH: usize = 32;

/// `INPUT_X=""` / `X=false` declarations for every argument
#[must_use]
pub fn flag_variables(procedure: &Procedure) -> String {
    let mut lines = Vec::new();
    for arg in procedure.arguments() {
        let var = arg.option.var_name();
        match arg.kind() {
            ArgumentKind::Dual => {
                lines.push(format!("{}=\"\"", arg.option.input_var()));
                lines.push(format!("{var}=false"));
            }
            ArgumentKind::InputOnly => lines.push(format!("{}=\"\"", arg.option.input_var())),
            ArgumentKind::ActionOnly => lines.push(format!("{var}=false")),
            ArgumentKind::Inert => {}
        }
    }
    lines.join("\n")
}

/// Declarations for the procedure's `global_variable` list
#[must_use]
pub fn global_variables(procedure: &Procedure) -> String {
    let mut lines = Vec::new();
    for var in procedure.global_variables() {
        match var.var_type {
            VariableType::Array => match &var.array_elements {
                Some(elements) => {
                    lines.push(format!("{}=(", var.name));
                    lines.extend(elements.iter().map(|e| format!("    \"{e}\"")));
                    lines.push(")".to_string());
                }
                None => lines.push(format!("{}=()", var.name)),
            },
            VariableType::String => lines.push(format!("{}=\"{}\"", var.name, var.default_literal())),
            VariableType::Integer | VariableType::Boolean => {
                lines.push(format!("{}={}", var.name, var.default_literal()));
            }
        }
    }
    lines.join("\n")
}

/// Variables injected from the YAML header, placed after the globals
#[must_use]
pub fn auto_variables(procedure: &Procedure) -> String {
    format!(
        "\n# Auto-injected variables from YAML (do not define these in global_variable section)\nNAME=\"{}\"\n",
        procedure.name()
    )
}

/// `process_input_arguments()` validating and copying user input
///
/// Empty when no argument takes input.
#[must_use]
pub fn input_processing(procedure: &Procedure) -> String {
    if !procedure.has_input_arguments() {
        return String::new();
    }

    let mut lines = vec![
        "# Input processing and type conversion".to_string(),
        "process_input_arguments() {".to_string(),
        "    # Process and validate input arguments based on their types".to_string(),
    ];

    for arg in procedure.arguments().iter().filter(|a| a.takes_input()) {
        let option = arg.option.as_str();
        let var = arg.option.var_name();
        let input = arg.option.input_var();

        lines.push(String::new());
        lines.push(format!("    # Process {option} argument"));
        lines.push(format!("    if [ -n \"${{{input}}}\" ]; then"));
        if arg.is_integer() {
            lines.push("        # Validate integer input".to_string());
            lines.push(format!(
                "        if ! echo \"${{{input}}}\" | grep -qE '^[0-9]+$'; then"
            ));
            lines.push(format!(
                "            echo \"Error: {option} requires a valid integer, got: ${{{input}}}\" >&2"
            ));
            lines.push("            exit 1".to_string());
            lines.push("        fi".to_string());
        } else {
            lines.push("        # Process string input".to_string());
        }
        lines.push(format!("        {var}_ARG=\"${{{input}}}\""));
        lines.push("    fi".to_string());
    }

    lines.push("}".to_string());
    lines.push(String::new());
    lines.join("\n")
}

/// `case` arms for the argument parser
#[must_use]
pub fn argument_parser(procedure: &Procedure) -> String {
    procedure
        .arguments()
        .iter()
        .filter_map(parser_arm)
        .collect::<Vec<_>>()
        .join("\n")
}

fn parser_arm(arg: &Argument) -> Option<String> {
    let option = arg.option.as_str();
    let var = arg.option.var_name();
    let input = arg.option.input_var();

    let store = match arg.kind() {
        ArgumentKind::Dual => format!("                {input}=\"$2\"\n                {var}=true\n"),
        ArgumentKind::InputOnly => format!("                {input}=\"$2\"\n"),
        ArgumentKind::ActionOnly => {
            return Some(format!("        {option})\n            {var}=true\n            ;;"));
        }
        ArgumentKind::Inert => return None,
    };

    Some(format!(
        "        {option})
            if [ -n \"$2\" ] && [ \"$2\" != \"${{2#-}}\" ]; then
                MISSING_VALUES=\"$MISSING_VALUES $1\"
            elif [ -n \"$2\" ]; then
{store}                shift
            else
                MISSING_VALUES=\"$MISSING_VALUES $1\"
            fi
            ;;"
    ))
}

/// Value placeholder shown after an input option in help text
#[must_use]
pub fn input_format(arg: &Argument) -> Option<&'static str> {
    if !arg.takes_input() {
        return None;
    }
    if arg.is_integer() {
        return Some("NUMBER");
    }

    let desc = arg.description.to_lowercase();
    let words: Vec<&str> = desc
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    // "on"/"off" as substrings would catch "application" and "information"
    let has_word = |w: &str| words.contains(&w);

    let format = if desc.contains("enable") || desc.contains("disable") || has_word("on") || has_word("off") {
        "ENABLE|DISABLE"
    } else if desc.contains("application")
        && ["block", "unblock", "remove"].iter().any(|w| desc.contains(w))
    {
        "APP_PATH"
    } else if desc.contains("file") || desc.contains("path") {
        "FILE_PATH"
    } else if desc.contains("size") {
        "SIZE"
    } else {
        "VALUE"
    };
    Some(format)
}

/// Option lines for the help screen
#[must_use]
pub fn help_text(procedure: &Procedure) -> String {
    procedure
        .arguments()
        .iter()
        .map(|arg| {
            let display = match input_format(arg) {
                Some(format) => format!("{} {format}", arg.option),
                None => arg.option.to_string(),
            };
            format!("  {display:<width$} {}", arg.description, width = HELP_COLUMN_WIDTH)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Function bodies with their header comments
#[must_use]
pub fn functions(procedure: &Procedure) -> String {
    let mut lines = Vec::new();
    for func in procedure.functions() {
        lines.push(format!("# Function: {}", func.name));
        lines.push(format!("# Type: {}", func.function_type));
        lines.push(format!("# Languages: {}", func.language.join(", ")));
        lines.push(format!("FUNCTION_LANG=\"{}\"", func.language.join(",")));

        let code = if func.sudo_required {
            lines.push("# Sudo privileges: Required (commands auto-transformed)".to_string());
            with_sudo(&func.code)
        } else {
            lines.push("# Sudo privileges: Not required".to_string());
            func.code.clone()
        };

        lines.push(String::new());
        lines.push(code);
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Prefix every `$("$CMD_X" ...)` command substitution with `$CMD_SUDO`
#[must_use]
pub fn with_sudo(code: &str) -> String {
    COMMAND_SUBSTITUTION
        .replace_all(code, |caps: &Captures<'_>| {
            let command = &caps[1];
            let args = caps[2].trim();
            if command == "SUDO" {
                caps[0].to_string()
            } else if args.is_empty() {
                format!("$(\"$CMD_SUDO\" \"$CMD_{command}\")")
            } else {
                format!("$(\"$CMD_SUDO\" \"$CMD_{command}\" {args})")
            }
        })
        .into_owned()
}

/// Dispatch block run from the script's main function
#[must_use]
pub fn main_execution(procedure: &Procedure) -> String {
    let mut lines = vec![
        "# Execute main logic".to_string(),
        "raw_output=\"\"".to_string(),
        String::new(),
        "# Set global function language for this procedure".to_string(),
        "FUNCTION_LANG=\"shell\"".to_string(),
        String::new(),
    ];

    if procedure.has_input_arguments() {
        lines.push("# Process input arguments".to_string());
        lines.push("process_input_arguments".to_string());
        lines.push(String::new());
    }

    lines.extend(
        [
            "# Helper function to execute procedure functions",
            "execute_function() {",
            "    local func_name=\"$1\"",
            "    # Functions handle their own permissions",
            "    $func_name",
            "}",
            "",
        ]
        .map(str::to_string),
    );

    for arg in procedure.arguments().iter().filter(|a| a.has_execution()) {
        let option = arg.option.as_str();
        lines.push(format!("# Execute functions for {option}"));
        lines.push(format!("if [ \"${}\" = true ]; then", arg.option.var_name()));
        lines.push(format!("    core_debug_print \"Executing functions for {option}\""));
        for func in &arg.execute_function {
            lines.push(format!("    result=$(execute_function {func})"));
            lines.push("    raw_output=\"${raw_output}${result}\"".to_string());
        }
        lines.push("fi".to_string());
        lines.push(String::new());
    }

    lines.push("# Set procedure name for processing".to_string());
    lines.push(format!("procedure=\"{}\"", procedure.name()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn procedure(yaml: &str) -> Procedure {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn sample() -> Procedure {
        procedure(amos_test_utils::SAMPLE_PROCEDURE_YAML)
    }

    #[test]
    fn flag_variables_per_kind() {
        assert_eq!(
            flag_variables(&sample()),
            "BASIC=false\nINPUT_OUTPUT_FILE=\"\"\nINPUT_TIMEOUT=\"\"\nTIMEOUT=false\nUSERS=false"
        );
    }

    #[test]
    fn global_variables_by_type() {
        assert_eq!(
            global_variables(&sample()),
            "DEFAULT_TIMEOUT=30\nREPORT_TITLE=\"System Report\"\nPROBES=(\n    \"hostname\"\n    \"uname\"\n)"
        );
    }

    #[test]
    fn empty_array_global() {
        let proc = procedure(
            "procedure_name: x\nprocedure:\n  arguments: []\n  global_variable:\n    - name: ITEMS\n      type: array\n",
        );
        assert_eq!(global_variables(&proc), "ITEMS=()");
    }

    #[test]
    fn input_processing_validates_integers() {
        let text = input_processing(&sample());
        assert!(text.starts_with("# Input processing and type conversion\nprocess_input_arguments() {"));
        assert!(text.contains("if ! echo \"${INPUT_TIMEOUT}\" | grep -qE '^[0-9]+$'; then"));
        assert!(text.contains("echo \"Error: -t|--timeout requires a valid integer, got: ${INPUT_TIMEOUT}\" >&2"));
        assert!(text.contains("        TIMEOUT_ARG=\"${INPUT_TIMEOUT}\""));
        assert!(text.contains("        OUTPUT_FILE_ARG=\"${INPUT_OUTPUT_FILE}\""));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn input_processing_empty_without_inputs() {
        let proc = procedure(
            "procedure_name: x\nprocedure:\n  arguments:\n    - option: --go\n      description: Go\n      execute_function: [go]\n",
        );
        assert_eq!(input_processing(&proc), "");
    }

    #[test]
    fn parser_arms() {
        let text = argument_parser(&sample());
        assert!(text.starts_with("        -b|--basic)\n            BASIC=true\n            ;;"));
        assert_eq!(
            parser_arm(&sample().arguments()[2]).unwrap(),
            "        -t|--timeout)
            if [ -n \"$2\" ] && [ \"$2\" != \"${2#-}\" ]; then
                MISSING_VALUES=\"$MISSING_VALUES $1\"
            elif [ -n \"$2\" ]; then
                INPUT_TIMEOUT=\"$2\"
                TIMEOUT=true
                shift
            else
                MISSING_VALUES=\"$MISSING_VALUES $1\"
            fi
            ;;"
        );
    }

    #[test]
    fn inert_arguments_have_no_arm() {
        let proc = procedure(
            "procedure_name: x\nprocedure:\n  arguments:\n    - option: --noop\n      description: Nothing\n",
        );
        assert_eq!(argument_parser(&proc), "");
        assert_eq!(flag_variables(&proc), "");
    }

    #[test]
    fn help_text_columns() {
        let lines: Vec<String> = help_text(&sample()).lines().map(str::to_string).collect();
        assert_eq!(lines[0], format!("  {:<32} Collect basic system information", "-b|--basic"));
        assert_eq!(lines[1], format!("  {:<32} Write results to the given file path", "--output-file FILE_PATH"));
        assert_eq!(lines[2], format!("  {:<32} Timeout in seconds", "-t|--timeout NUMBER"));
    }

    #[test]
    fn input_format_keywords() {
        let arg = |desc: &str| -> Argument {
            serde_yaml::from_str(&format!("option: --x\ndescription: \"{desc}\"\ntype: string\n")).unwrap()
        };
        assert_eq!(input_format(&arg("Enable or disable the firewall")), Some("ENABLE|DISABLE"));
        assert_eq!(input_format(&arg("Turn logging on")), Some("ENABLE|DISABLE"));
        assert_eq!(input_format(&arg("Block application at path")), Some("APP_PATH"));
        assert_eq!(input_format(&arg("Read from file")), Some("FILE_PATH"));
        assert_eq!(input_format(&arg("Maximum size")), Some("SIZE"));
        assert_eq!(input_format(&arg("Collection filter")), Some("VALUE"));
    }

    #[test]
    fn on_and_off_match_whole_words_only() {
        let arg = |desc: &str| -> Argument {
            serde_yaml::from_str(&format!("option: --x\ndescription: \"{desc}\"\ntype: string\n")).unwrap()
        };
        assert_eq!(input_format(&arg("Show connection information")), Some("VALUE"));
        assert_eq!(input_format(&arg("Remove application from the list")), Some("APP_PATH"));
        assert_eq!(input_format(&arg("Switch sharing off")), Some("ENABLE|DISABLE"));
        assert_eq!(input_format(&arg("Set auto-login on/off")), Some("ENABLE|DISABLE"));
    }

    #[test]
    fn sudo_transform() {
        assert_eq!(
            with_sudo(r#"users=$("$CMD_DSCL" . -list /Users)"#),
            r#"users=$("$CMD_SUDO" "$CMD_DSCL" . -list /Users)"#
        );
        assert_eq!(with_sudo(r#"x=$( "$CMD_ID" )"#), r#"x=$("$CMD_SUDO" "$CMD_ID")"#);
        let once = with_sudo(r#"$("$CMD_LS" /)"#);
        assert_eq!(with_sudo(&once), once);
    }

    #[test]
    fn function_headers() {
        let text = functions(&sample());
        assert!(text.starts_with(
            "# Function: collect_basic\n# Type: main\n# Languages: shell\nFUNCTION_LANG=\"shell\"\n# Sudo privileges: Not required\n\ncollect_basic() {"
        ));
        assert!(text.contains("# Sudo privileges: Required (commands auto-transformed)"));
        assert!(text.contains(r#"users=$("$CMD_SUDO" "$CMD_DSCL" . -list /Users)"#));
    }

    #[test]
    fn main_execution_dispatch() {
        let text = main_execution(&sample());
        assert!(text.starts_with("# Execute main logic\nraw_output=\"\"\n"));
        assert!(text.contains("# Process input arguments\nprocess_input_arguments\n"));
        assert!(text.contains(
            "if [ \"$TIMEOUT\" = true ]; then\n    core_debug_print \"Executing functions for -t|--timeout\"\n    result=$(execute_function apply_timeout)\n    raw_output=\"${raw_output}${result}\"\nfi"
        ));
        assert!(!text.contains("$OUTPUT_FILE\" = true"));
        assert!(text.ends_with("procedure=\"system_info\""));
    }
}
