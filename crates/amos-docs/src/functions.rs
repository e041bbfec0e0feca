//! Core function extraction and doc naming

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static CORE_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^(core_\w+)\(\)\s*\{(.*?)^\}").expect("core function regex is valid")
});

/// Functions whose doc pages do not follow the Title Case rule
const SPECIAL_NAMES: &[(&str, &str)] = &[
    ("validate_input", "Input Validation"),
    ("debug_print", "Debugger"),
    ("handle_error", "Error Handler"),
];

/// Extract every top-level `core_` function from template text
///
/// A function runs from `core_name() {` to the first `}` in column 0.
/// Bodies are trimmed and rebuilt as `name() {\n<body>\n}`.
#[must_use]
pub fn extract_core_functions(text: &str) -> IndexMap<String, String> {
    CORE_FUNCTION
        .captures_iter(text)
        .map(|caps| {
            let name = caps[1].to_string();
            let code = format!("{name}() {{\n{}\n}}", caps[2].trim());
            (name, code)
        })
        .collect()
}

/// Human title for a function: `core_log_output` -> `Log Output`
#[must_use]
pub fn title(func: &str) -> String {
    let name = func.strip_prefix("core_").unwrap_or(func);
    if let Some((_, special)) = SPECIAL_NAMES.iter().find(|(key, _)| *key == name) {
        return (*special).to_string();
    }
    title_case(name)
}

/// Documentation file name for a function
#[must_use]
pub fn doc_file_name(func: &str) -> String {
    format!("{}.md", title(func))
}

pub(crate) fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = "#!/bin/sh\nX=1\n\ncore_one() {\n    echo one\n    if true; then\n        :\n    fi\n}\n\nhelper() {\n    :\n}\n\ncore_two() {\n  echo two\n}\n";

    #[test]
    fn extracts_in_order_with_trimmed_bodies() {
        let functions = extract_core_functions(TEMPLATE);
        let names: Vec<_> = functions.keys().cloned().collect();
        assert_eq!(names, vec!["core_one", "core_two"]);
        assert_eq!(
            functions["core_one"],
            "core_one() {\necho one\n    if true; then\n        :\n    fi\n}"
        );
        assert_eq!(functions["core_two"], "core_two() {\necho two\n}");
    }

    #[test]
    fn indented_definitions_are_ignored() {
        let functions = extract_core_functions("main() {\n    core_inner() {\n        :\n    }\n}\n");
        assert!(functions.is_empty());
    }

    #[test]
    fn doc_names() {
        assert_eq!(doc_file_name("core_validate_input"), "Input Validation.md");
        assert_eq!(doc_file_name("core_debug_print"), "Debugger.md");
        assert_eq!(doc_file_name("core_handle_error"), "Error Handler.md");
        assert_eq!(doc_file_name("core_generate_job_id"), "Generate Job Id.md");
        assert_eq!(doc_file_name("core_check_fda"), "Check Fda.md");
        assert_eq!(doc_file_name("core_main"), "Main.md");
    }
}
