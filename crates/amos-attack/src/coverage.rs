//! Technique coverage
//!
//! Coverage is normally collected from the project's procedures: a built
//! script makes its technique green, a defined but unbuilt procedure makes
//! it yellow. A TOML overlay can add techniques covered elsewhere:
//!
//! ```toml
//! yellow = ["T1007", "T1016"]
//!
//! [green]
//! "T1087.001" = 12
//!
//! [scripts]
//! "T1087.001" = "ttp/discovery/accounts.sh"
//! ```

use crate::error::{AttackError, AttackResult};
use amos_procedure::Procedure;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Matrix cell state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    /// Built, with the number of procedures
    Green(u32),
    /// Defined but not built
    Yellow,
    /// Not covered
    Red,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoverageFile {
    green: BTreeMap<String, u32>,
    yellow: Vec<String>,
    scripts: BTreeMap<String, String>,
}

/// Coverage per technique id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    implemented: BTreeMap<String, u32>,
    planned: BTreeSet<String>,
    scripts: BTreeMap<String, String>,
}

impl Coverage {
    /// Empty coverage, every technique red
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one built procedure for `technique`; the first script seen
    /// becomes the cell link
    pub fn add_built(&mut self, technique: impl Into<String>, script: impl Into<String>) {
        let technique = technique.into();
        *self.implemented.entry(technique.clone()).or_insert(0) += 1;
        self.scripts.entry(technique).or_insert_with(|| script.into());
    }

    /// Mark `technique` as defined but not built
    pub fn add_planned(&mut self, technique: impl Into<String>) {
        self.planned.insert(technique.into());
    }

    /// Record a procedure, built when `script` is its output path relative
    /// to the project root
    pub fn record(&mut self, procedure: &Procedure, script: Option<String>) {
        match script {
            Some(script) => self.add_built(procedure.ttp_id(), script),
            None => self.add_planned(procedure.ttp_id()),
        }
    }

    /// Parse a TOML overlay
    ///
    /// # Errors
    /// Returns `AttackError::Coverage` on malformed TOML
    pub fn from_toml(path: impl AsRef<Path>, text: &str) -> AttackResult<Self> {
        let file: CoverageFile = toml::from_str(text).map_err(|source| AttackError::Coverage {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Ok(Self {
            implemented: file.green,
            planned: file.yellow.into_iter().collect(),
            scripts: file.scripts,
        })
    }

    /// Read a TOML overlay
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> AttackResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AttackError::io_error(path, e))?;
        Self::from_toml(path, &text)
    }

    /// Fold `other` in; counts add up and existing links win
    pub fn merge(&mut self, other: Coverage) {
        for (technique, count) in other.implemented {
            *self.implemented.entry(technique).or_insert(0) += count;
        }
        self.planned.extend(other.planned);
        for (technique, script) in other.scripts {
            self.scripts.entry(technique).or_insert(script);
        }
    }

    /// State of a technique's cell
    #[must_use]
    pub fn status(&self, technique: &str) -> CellStatus {
        if let Some(count) = self.implemented.get(technique) {
            CellStatus::Green(*count)
        } else if self.planned.contains(technique) {
            CellStatus::Yellow
        } else {
            CellStatus::Red
        }
    }

    /// Script linked from a technique's cell
    #[must_use]
    pub fn script(&self, technique: &str) -> Option<&str> {
        self.scripts.get(technique).map(String::as_str)
    }

    /// Techniques with at least one built procedure
    #[inline]
    #[must_use]
    pub fn implemented_techniques(&self) -> usize {
        self.implemented.len()
    }

    /// Built procedures across all techniques
    #[must_use]
    pub fn implemented_procedures(&self) -> u32 {
        self.implemented.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_beats_planned() {
        let mut coverage = Coverage::new();
        coverage.add_planned("T1082");
        coverage.add_built("T1082", "ttp/discovery/shell/system_info.sh");
        coverage.add_built("T1082", "ttp/discovery/shell/other.sh");
        coverage.add_planned("T1016");

        assert_eq!(coverage.status("T1082"), CellStatus::Green(2));
        assert_eq!(coverage.status("T1016"), CellStatus::Yellow);
        assert_eq!(coverage.status("T1000"), CellStatus::Red);
        assert_eq!(coverage.script("T1082"), Some("ttp/discovery/shell/system_info.sh"));
        assert_eq!(coverage.implemented_procedures(), 2);
    }

    #[test]
    fn overlay_parses_and_merges() {
        let overlay = Coverage::from_toml(
            "coverage.toml",
            "yellow = [\"T1007\"]\n\n[green]\n\"T1087.001\" = 12\n\n[scripts]\n\"T1087.001\" = \"ttp/discovery/accounts.sh\"\n",
        )
        .unwrap();
        let mut coverage = Coverage::new();
        coverage.add_built("T1087.001", "ttp/discovery/shell/accounts.sh");
        coverage.merge(overlay);

        assert_eq!(coverage.status("T1087.001"), CellStatus::Green(13));
        assert_eq!(coverage.status("T1007"), CellStatus::Yellow);
        assert_eq!(coverage.script("T1087.001"), Some("ttp/discovery/shell/accounts.sh"));
        assert_eq!(coverage.implemented_techniques(), 1);
    }

    #[test]
    fn malformed_overlay_names_file() {
        let err = Coverage::from_toml("bad.toml", "green = 3").unwrap_err();
        assert!(matches!(err, AttackError::Coverage { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
