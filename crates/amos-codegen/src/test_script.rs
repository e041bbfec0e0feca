//! Smoke-test scripts for built procedures

use amos_procedure::{Argument, Procedure};

/// Value passed to integer options
pub const INTEGER_SAMPLE: &str = "30";

/// Value passed to string options
pub const STRING_SAMPLE: &str = "\"test_value\"";

/// Render a bash script invoking `script_ref` with every option
///
/// `script_ref` is the script path as seen from the test script's
/// directory. Options use their long form so `-x|--long` pairs stay valid
/// shell words.
#[must_use]
pub fn test_script(script_ref: &str, procedure: &Procedure) -> String {
    let file_name = script_ref.rsplit('/').next().unwrap_or(script_ref);
    let options: Vec<String> = procedure.arguments().iter().map(invocation).collect();

    let mut command = script_ref.to_string();
    if !options.is_empty() {
        command.push(' ');
        command.push_str(&options.join(" "));
    }

    format!("#!/bin/bash\n# Auto-generated test for {file_name}\n\n# Test with all options\n{command}\n")
}

fn invocation(arg: &Argument) -> String {
    let option = arg.option.long();
    if arg.is_integer() {
        format!("{option} {INTEGER_SAMPLE}")
    } else if arg.takes_input() {
        format!("{option} {STRING_SAMPLE}")
    } else {
        option.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_all_options() {
        let proc: Procedure = serde_yaml::from_str(amos_test_utils::SAMPLE_PROCEDURE_YAML).unwrap();
        let script = test_script("../../attackmacos/ttp/discovery/shell/system_info.sh", &proc);
        assert_eq!(
            script,
            "#!/bin/bash\n# Auto-generated test for system_info.sh\n\n# Test with all options\n../../attackmacos/ttp/discovery/shell/system_info.sh --basic --output-file \"test_value\" --timeout 30 --users\n"
        );
    }
}
