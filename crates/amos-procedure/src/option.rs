//! Command-line option specs for procedure arguments
//!
//! An argument's `option` is either a long form (`--verbose`) or a
//! short/long pair separated by a pipe (`-v|--verbose`). The pair form is
//! emitted verbatim as a shell `case` pattern, so the raw text is kept.

use crate::error::OptionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parsed argument option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionSpec {
    raw: String,
    short: Option<String>,
    long: String,
}

impl OptionSpec {
    /// Parse an option string
    ///
    /// # Errors
    /// Returns error if the option is blank or has no long form
    pub fn parse(raw: &str) -> Result<Self, OptionError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OptionError::Empty);
        }

        let (short, long) = match raw.split_once('|') {
            Some((short, long)) => (Some(short.trim().to_string()), long.trim().to_string()),
            None => (None, raw.to_string()),
        };

        if long.trim_start_matches('-').is_empty() {
            return Err(OptionError::MissingLongForm(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            short,
            long,
        })
    }

    /// Option text as written in YAML
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Short form (`-v`), if any
    #[inline]
    #[must_use]
    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    /// Long form (`--verbose`)
    #[inline]
    #[must_use]
    pub fn long(&self) -> &str {
        &self.long
    }

    /// Shell variable name for the trigger flag
    ///
    /// `--output-file` becomes `OUTPUT_FILE`.
    #[must_use]
    pub fn var_name(&self) -> String {
        self.long
            .trim_start_matches('-')
            .to_uppercase()
            .replace('-', "_")
    }

    /// Shell variable holding the raw user input
    #[inline]
    #[must_use]
    pub fn input_var(&self) -> String {
        format!("INPUT_{}", self.var_name())
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for OptionSpec {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OptionSpec {
    type Error = OptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OptionSpec> for String {
    fn from(spec: OptionSpec) -> Self {
        spec.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn long_only() {
        let spec = OptionSpec::parse("--list-users").unwrap();
        assert_eq!(spec.short(), None);
        assert_eq!(spec.long(), "--list-users");
        assert_eq!(spec.var_name(), "LIST_USERS");
        assert_eq!(spec.input_var(), "INPUT_LIST_USERS");
    }

    #[test]
    fn short_and_long() {
        let spec = OptionSpec::parse("-s|--system").unwrap();
        assert_eq!(spec.short(), Some("-s"));
        assert_eq!(spec.long(), "--system");
        assert_eq!(spec.var_name(), "SYSTEM");
        assert_eq!(spec.as_str(), "-s|--system");
    }

    #[test]
    fn rejects_blank_and_dash_only() {
        assert_eq!(OptionSpec::parse("  "), Err(OptionError::Empty));
        assert!(matches!(
            OptionSpec::parse("-x|--"),
            Err(OptionError::MissingLongForm(_))
        ));
    }

    #[test]
    fn deserializes_from_yaml_string() {
        let spec: OptionSpec = serde_yaml::from_str("\"-f|--firewall-state\"").unwrap();
        assert_eq!(spec.var_name(), "FIREWALL_STATE");
    }

    proptest! {
        #[test]
        fn var_name_is_shell_identifier(name in "[a-z][a-z0-9]{0,8}(-[a-z0-9]{1,6}){0,3}") {
            let spec = OptionSpec::parse(&format!("--{name}")).unwrap();
            let var = spec.var_name();
            prop_assert!(var.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
            prop_assert_eq!(var.len(), name.len());
        }
    }
}
