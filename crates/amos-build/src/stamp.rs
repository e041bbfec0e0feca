//! GUID and date stamping
//!
//! Successful builds replace the `$GUID` / `$UPDATED` placeholders in the
//! procedure YAML and the `[GUID]` / `[UPDATED]` tokens in the script.
//! The YAML is edited as text so comments and block scalars survive.

use crate::error::{BuildError, BuildResult};
use amos_procedure::{GUID_PLACEHOLDER, UPDATED_PLACEHOLDER};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::path::Path;

static UPDATED_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^updated:[ \t]*['"]?[0-9]{4}-[0-9]{2}-[0-9]{2}['"]?"#)
        .expect("updated field regex is valid")
});

static VERSION_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^version:[ \t]*['"]?[0-9]+\.[0-9]+\.[0-9]+['"]?"#)
        .expect("version field regex is valid")
});

static GUID_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(#[ \t]*GUID:[ \t]*)\[GUID\]").expect("GUID header regex is valid")
});

static UPDATED_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(#[ \t]*Updated:[ \t]*)\[UPDATED\]").expect("updated header regex is valid")
});

/// Values written by one stamping pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Fresh procedure GUID
    pub guid: String,
    /// Build date, `%Y-%m-%d`
    pub date: String,
}

impl Stamp {
    /// Stamp with explicit values
    #[must_use]
    pub fn new(guid: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            date: date.into(),
        }
    }

    /// New v4 GUID and today's local date
    #[must_use]
    pub fn generate() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            chrono::Local::now().format("%Y-%m-%d").to_string(),
        )
    }
}

/// Applies a [`Stamp`] to procedure YAML and scripts
#[derive(Debug, Clone)]
pub struct Stamper {
    stamp: Stamp,
}

impl Stamper {
    /// Stamper for `stamp`
    #[must_use]
    pub fn new(stamp: Stamp) -> Self {
        Self { stamp }
    }

    /// Stamp in use
    #[inline]
    #[must_use]
    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    /// Fill placeholders in YAML text
    ///
    /// With `bumped_version` (force rebuilds) any existing top-level
    /// `updated:` date is refreshed and `version:` is rewritten.
    #[must_use]
    pub fn stamp_yaml(&self, text: &str, bumped_version: Option<&str>) -> String {
        let updated = format!("updated: '{}'", self.stamp.date);
        let mut out = text
            .replace(&format!("guid: {GUID_PLACEHOLDER}"), &format!("guid: {}", self.stamp.guid))
            .replace(&format!("updated: {UPDATED_PLACEHOLDER}"), &updated);

        if let Some(version) = bumped_version {
            out = UPDATED_FIELD.replace_all(&out, NoExpand(&updated)).into_owned();
            out = VERSION_FIELD
                .replace_all(&out, NoExpand(&format!("version: {version}")))
                .into_owned();
        }
        out
    }

    /// Fill the `# GUID:` and `# Updated:` header tokens; the same tokens
    /// inside function code are left alone
    #[must_use]
    pub fn stamp_script(&self, text: &str) -> String {
        let out = GUID_HEADER.replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{}{}", &caps[1], self.stamp.guid)
        });
        UPDATED_HEADER
            .replace_all(&out, |caps: &regex::Captures<'_>| format!("{}{}", &caps[1], self.stamp.date))
            .into_owned()
    }

    /// Rewrite both files in place
    ///
    /// # Errors
    /// Returns `BuildError::Io` if either file cannot be read or written
    pub async fn apply(&self, yaml: &Path, script: &Path, bumped_version: Option<&str>) -> BuildResult<()> {
        let text = tokio::fs::read_to_string(yaml)
            .await
            .map_err(|e| BuildError::io_error(yaml, e))?;
        tokio::fs::write(yaml, self.stamp_yaml(&text, bumped_version))
            .await
            .map_err(|e| BuildError::io_error(yaml, e))?;

        let text = tokio::fs::read_to_string(script)
            .await
            .map_err(|e| BuildError::io_error(script, e))?;
        tokio::fs::write(script, self.stamp_script(&text))
            .await
            .map_err(|e| BuildError::io_error(script, e))?;

        tracing::info!(guid = %self.stamp.guid, date = %self.stamp.date, "stamped procedure");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stamper() -> Stamper {
        Stamper::new(Stamp::new("11111111-2222-4333-8444-555555555555", "2026-03-04"))
    }

    #[test]
    fn fills_placeholders_and_keeps_formatting() {
        let yaml = "procedure_name: x\nguid: $GUID\nupdated: $UPDATED\nversion: 1.0.0\n# note\ncode: |\n  echo [GUID]\n";
        assert_eq!(
            stamper().stamp_yaml(yaml, None),
            "procedure_name: x\nguid: 11111111-2222-4333-8444-555555555555\nupdated: '2026-03-04'\nversion: 1.0.0\n# note\ncode: |\n  echo [GUID]\n"
        );
    }

    #[test]
    fn force_refreshes_date_and_version() {
        let yaml = "guid: abc\nupdated: \"2024-01-01\"\nversion: '1.2.3'\nprocedure:\n  version: 9.9.9\n";
        assert_eq!(
            stamper().stamp_yaml(yaml, Some("1.2.4")),
            "guid: abc\nupdated: '2026-03-04'\nversion: 1.2.4\nprocedure:\n  version: 9.9.9\n"
        );
    }

    #[test]
    fn replacement_text_is_literal() {
        let stamper = Stamper::new(Stamp::new("g", "$1"));
        assert_eq!(stamper.stamp_yaml("updated: 2024-01-01\n", Some("1.0.1")), "updated: '$1'\n");
    }

    #[test]
    fn script_tokens_are_replaced() {
        let script = "# GUID: [GUID]\n# Updated: [UPDATED]\n";
        assert_eq!(
            stamper().stamp_script(script),
            "# GUID: 11111111-2222-4333-8444-555555555555\n# Updated: 2026-03-04\n"
        );
    }

    #[test]
    fn function_code_keeps_its_tokens() {
        let script = "#!/bin/sh\n# GUID: [GUID]\n# Updated: [UPDATED]\n\nshow_ids() {\n    $CMD_PRINTF \"[GUID] [UPDATED]\\n\"\n    # GUID: [GUID]\n}\n";
        assert_eq!(
            stamper().stamp_script(script),
            "#!/bin/sh\n# GUID: 11111111-2222-4333-8444-555555555555\n# Updated: 2026-03-04\n\nshow_ids() {\n    $CMD_PRINTF \"[GUID] [UPDATED]\\n\"\n    # GUID: [GUID]\n}\n"
        );
    }

    #[test]
    fn generated_stamp_is_well_formed() {
        let stamp = Stamp::generate();
        assert!(uuid::Uuid::parse_str(&stamp.guid).is_ok());
        assert!(chrono::NaiveDate::parse_from_str(&stamp.date, "%Y-%m-%d").is_ok());
    }

    #[tokio::test]
    async fn apply_rewrites_files() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("p.yml");
        let script = dir.path().join("p.sh");
        std::fs::write(&yaml, "guid: $GUID\n").unwrap();
        std::fs::write(&script, "# GUID: [GUID]\n").unwrap();

        stamper().apply(&yaml, &script, None).await.unwrap();
        assert_eq!(std::fs::read_to_string(&yaml).unwrap(), "guid: 11111111-2222-4333-8444-555555555555\n");
        assert_eq!(std::fs::read_to_string(&script).unwrap(), "# GUID: 11111111-2222-4333-8444-555555555555\n");
    }
}
