//! STIX bundle model and queries
//!
//! Only the fields the reports need are modelled; everything else in the
//! enterprise bundle is ignored on load.

use crate::error::{AttackError, AttackResult};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;

/// STIX object type of techniques
pub const ATTACK_PATTERN: &str = "attack-pattern";

/// Kill chain and reference source used by ATT&CK
pub const MITRE_ATTACK: &str = "mitre-attack";

/// Characters of leading context kept by [`context_lines`]
pub const CONTEXT_CHARS: usize = 20;

/// Kill chain phase of a technique
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KillChainPhase {
    /// `mitre-attack` for ATT&CK phases
    pub kill_chain_name: String,
    /// Tactic in kebab-case, e.g. `defense-evasion`
    pub phase_name: String,
}

/// External reference, ATT&CK ids live here
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalReference {
    /// Reference source, `mitre-attack` for ATT&CK ids
    pub source_name: String,
    /// Id in that source
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Any STIX domain object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StixObject {
    /// STIX type, e.g. `attack-pattern`
    #[serde(rename = "type")]
    pub object_type: String,
    /// STIX id, `attack-pattern--<uuid>`
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "x_mitre_platforms")]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub kill_chain_phases: Vec<KillChainPhase>,
    #[serde(default)]
    pub external_references: Vec<ExternalReference>,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default, rename = "x_mitre_deprecated")]
    pub deprecated: bool,
}

/// Techniques are `attack-pattern` objects
pub type AttackPattern = StixObject;

impl StixObject {
    /// ATT&CK id from the first `mitre-attack` reference
    #[must_use]
    pub fn attack_id(&self) -> Option<&str> {
        self.external_references
            .iter()
            .find(|r| r.source_name == MITRE_ATTACK)
            .and_then(|r| r.external_id.as_deref())
    }

    /// True for technique objects
    #[inline]
    #[must_use]
    pub fn is_attack_pattern(&self) -> bool {
        self.object_type == ATTACK_PATTERN
    }

    /// Neither revoked nor deprecated
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.deprecated
    }

    /// Phase names on the ATT&CK kill chain
    pub fn mitre_phases(&self) -> impl Iterator<Item = &str> {
        self.kill_chain_phases
            .iter()
            .filter(|p| p.kill_chain_name == MITRE_ATTACK)
            .map(|p| p.phase_name.as_str())
    }
}

#[derive(Deserialize)]
struct Bundle {
    #[serde(default)]
    objects: Vec<StixObject>,
}

/// Loaded ATT&CK dataset
#[derive(Debug, Clone, Default)]
pub struct AttackDataset {
    objects: Vec<StixObject>,
}

impl AttackDataset {
    /// Parse bundle JSON
    ///
    /// # Errors
    /// Returns `AttackError::Bundle` on malformed JSON
    pub fn from_json(text: &str) -> AttackResult<Self> {
        let bundle: Bundle = serde_json::from_str(text)?;
        tracing::debug!(objects = bundle.objects.len(), "loaded STIX bundle");
        Ok(Self {
            objects: bundle.objects,
        })
    }

    /// Read a bundle file such as `enterprise-attack.json`
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> AttackResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AttackError::io_error(path, e))?;
        Self::from_json(&text)
    }

    /// Every object in bundle order
    #[inline]
    #[must_use]
    pub fn objects(&self) -> &[StixObject] {
        &self.objects
    }

    /// Techniques in bundle order
    pub fn attack_patterns(&self) -> impl Iterator<Item = &AttackPattern> {
        self.objects.iter().filter(|o| o.is_attack_pattern())
    }

    /// Technique by ATT&CK id
    #[must_use]
    pub fn technique(&self, attack_id: &str) -> Option<&AttackPattern> {
        self.attack_patterns().find(|t| t.attack_id() == Some(attack_id))
    }

    /// Techniques listing `platform`
    #[must_use]
    pub fn techniques_by_platform(&self, platform: &str, remove_revoked_deprecated: bool) -> Vec<&AttackPattern> {
        self.attack_patterns()
            .filter(|t| t.platforms.iter().any(|p| p == platform))
            .filter(|t| !remove_revoked_deprecated || t.is_active())
            .collect()
    }

    /// Objects whose description contains `needle`, ignoring case
    #[must_use]
    pub fn objects_by_content(
        &self,
        needle: &str,
        object_type: Option<&str>,
        remove_revoked_deprecated: bool,
    ) -> Vec<&StixObject> {
        let needle = needle.to_lowercase();
        self.objects
            .iter()
            .filter(|o| object_type.map_or(true, |t| o.object_type == t))
            .filter(|o| !remove_revoked_deprecated || o.is_active())
            .filter(|o| o.description.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Lines of `description` mentioning `term`, each with up to
/// [`CONTEXT_CHARS`] characters of leading context
#[must_use]
pub fn context_lines(description: &str, term: &str) -> Vec<String> {
    let pattern = format!(".{{0,{CONTEXT_CHARS}}}{}.*", regex::escape(term));
    let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        return Vec::new();
    };
    re.find_iter(description).map(|m| m.as_str().to_string()).collect()
}

/// Wrap each case-insensitive occurrence of `term` with `before`/`after`
#[must_use]
pub fn highlight(line: &str, term: &str, before: &str, after: &str) -> String {
    match Regex::new(&format!("(?i){}", regex::escape(term))) {
        Ok(re) => re
            .replace_all(line, |caps: &regex::Captures<'_>| format!("{before}{}{after}", &caps[0]))
            .into_owned(),
        Err(_) => line.to_string(),
    }
}

/// Group techniques by ATT&CK phase: phase -> `(id, name)` in input order
#[must_use]
pub fn group_by_tactic(techniques: &[&AttackPattern]) -> IndexMap<String, Vec<(String, String)>> {
    let mut tactics: IndexMap<String, Vec<(String, String)>> = IndexMap::new();
    for technique in techniques {
        let id = technique.attack_id().unwrap_or("N/A");
        for phase in technique.mitre_phases() {
            tactics
                .entry(phase.to_string())
                .or_default()
                .push((id.to_string(), technique.name.clone()));
        }
    }
    tactics
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset() -> AttackDataset {
        AttackDataset::from_json(amos_test_utils::STIX_BUNDLE_JSON).unwrap()
    }

    #[test]
    fn platform_filter_honours_revocation() {
        let data = dataset();
        let ids = |v: Vec<&AttackPattern>| v.iter().filter_map(|t| t.attack_id()).map(String::from).collect::<Vec<_>>();
        assert_eq!(
            ids(data.techniques_by_platform("macOS", true)),
            vec!["T1082", "T1059", "T1078", "T1548.001", "T1555"]
        );
        assert_eq!(data.techniques_by_platform("macOS", false).len(), 7);
        assert_eq!(data.techniques_by_platform("Linux", true).len(), 3);
    }

    #[test]
    fn content_search_is_case_insensitive_and_typed() {
        let data = dataset();
        let all: Vec<_> = data.objects_by_content("KEYCHAIN", None, true).iter().map(|o| o.name.clone()).collect();
        assert_eq!(all, vec!["Credentials from Password Stores", "Keychain Stealer"]);

        let techniques = data.objects_by_content("keychain", Some(ATTACK_PATTERN), false);
        assert_eq!(techniques.len(), 2);
    }

    #[test]
    fn context_lines_keep_twenty_leading_chars() {
        let text = "first line has nothing\nA long prefix before Valid Accounts and the rest\nvalid accounts again";
        assert_eq!(
            context_lines(text, "Valid Accounts"),
            vec![" long prefix before Valid Accounts and the rest", "valid accounts again"]
        );
    }

    #[test]
    fn highlight_preserves_original_case() {
        assert_eq!(highlight("uses valid Accounts", "Valid Accounts", "<", ">"), "uses <valid Accounts>");
    }

    #[test]
    fn grouping_follows_kill_chain_phases() {
        let data = dataset();
        let techniques = data.techniques_by_platform("macOS", true);
        let tactics = group_by_tactic(&techniques);
        assert_eq!(tactics["discovery"], vec![("T1082".to_string(), "System Information Discovery".to_string())]);
        assert_eq!(tactics["privilege-escalation"].len(), 2);
        assert_eq!(tactics.keys().next().map(String::as_str), Some("discovery"));
    }

    #[test]
    fn attack_id_uses_mitre_reference() {
        let data = dataset();
        assert_eq!(data.technique("T1548.001").map(|t| t.name.as_str()), Some("Setuid and Setgid"));
        assert!(data.technique("T9999").is_none());
    }
}
