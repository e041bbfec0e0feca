//! Caldera plugin sync
//!
//! Publishes built scripts as Caldera payloads with one ability per
//! script. Arguments reach the script through the `user.arg` fact.

use crate::config::ProjectLayout;
use crate::error::{BuildError, BuildResult};
use amos_procedure::{load_procedure, Procedure};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

/// Ability timeout in seconds
pub const ABILITY_TIMEOUT: u32 = 300;

/// Caldera ability document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ability {
    /// Procedure GUID, nil while unstamped
    pub id: String,
    /// Procedure name
    pub name: String,
    /// Procedure description
    pub description: String,
    /// Lower-cased tactic name
    pub tactic: String,
    pub technique: AbilityTechnique,
    pub platforms: AbilityPlatforms,
    /// One instance per operation
    pub singleton: bool,
    /// `user.arg` fact requirement
    pub requirements: Vec<BTreeMap<String, Requirement>>,
}

/// ATT&CK reference of an ability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityTechnique {
    /// Technique id, e.g. `T1082`
    pub attack_id: String,
    /// Technique name
    pub name: String,
}

/// Platform table, darwin only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityPlatforms {
    /// macOS executors
    pub darwin: DarwinExecutors,
}

/// Executors for darwin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DarwinExecutors {
    /// POSIX shell executor
    pub sh: Executor,
}

/// `sh` executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Executor {
    /// Command line run by the agent
    pub command: String,
    /// Payload file names copied to the agent
    pub payloads: Vec<String>,
    /// Cleanup commands
    pub cleanup: Vec<String>,
    /// Seconds before the agent gives up
    pub timeout: u32,
    pub parsers: Vec<Parser>,
    /// Remove the payload after the run
    pub delete_payload: bool,
}

/// Output parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parser {
    /// Parser module, e.g. `base64`
    pub module: String,
    /// Fact the parsed output is stored under
    pub property: String,
}

/// Fact requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// Fact relation, `has_property`
    pub edge: String,
}

impl Ability {
    /// Ability for a built procedure
    #[must_use]
    pub fn for_procedure(procedure: &Procedure) -> Self {
        let name = procedure.name();
        let payload = format!("{name}.sh");
        let id = match procedure.guid() {
            Some(guid) if !procedure.has_guid_placeholder() => guid.to_string(),
            _ => NIL_GUID.to_string(),
        };

        Self {
            id,
            name: name.to_string(),
            description: procedure.description(),
            tactic: procedure.tactic_name().to_lowercase(),
            technique: AbilityTechnique {
                attack_id: procedure.ttp_id().to_string(),
                name: procedure.technique_name().to_string(),
            },
            platforms: AbilityPlatforms {
                darwin: DarwinExecutors {
                    sh: Executor {
                        command: format!("#{{location}}/{payload} #{{user.arg}}"),
                        payloads: vec![payload.clone()],
                        cleanup: vec![format!("rm -f #{{location}}/{payload}")],
                        timeout: ABILITY_TIMEOUT,
                        parsers: vec![Parser {
                            module: "base64".to_string(),
                            property: format!("attackmacos.{name}.output"),
                        }],
                        delete_payload: true,
                    },
                },
            },
            singleton: true,
            requirements: vec![BTreeMap::from([(
                "user.arg".to_string(),
                Requirement {
                    edge: "has_property".to_string(),
                },
            )])],
        }
    }

    /// YAML document holding this ability as a one-element list
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> BuildResult<String> {
        let body = serde_yaml::to_string(&[self])?;
        Ok(format!("---\n{body}"))
    }
}

/// Result of a plugin sync
#[derive(Debug, Default)]
pub struct SyncSummary {
    /// Scripts copied to `data/payloads`
    pub payloads: usize,
    /// Ability files written
    pub abilities: Vec<PathBuf>,
    /// Procedures skipped because no script was built
    pub skipped: Vec<String>,
    /// Procedures that could not be synced
    pub failed: Vec<(PathBuf, String)>,
    /// Written `abilities.md`
    pub docs: Option<PathBuf>,
    /// Plugin directory
    pub plugin_dir: PathBuf,
}

/// Syncs built scripts into the Caldera plugin tree
#[derive(Debug)]
pub struct CalderaSync<'a> {
    layout: &'a ProjectLayout,
}

impl<'a> CalderaSync<'a> {
    /// Sync for `layout`
    #[must_use]
    pub fn new(layout: &'a ProjectLayout) -> Self {
        Self { layout }
    }

    /// Copy payloads, write abilities and the abilities reference
    ///
    /// # Errors
    /// Returns error if plugin directories cannot be created or the
    /// config directory cannot be listed
    pub fn run(&self) -> BuildResult<SyncSummary> {
        let plugin_dir = self.layout.caldera_plugin_dir();
        let payloads_dir = plugin_dir.join("data").join("payloads");
        let abilities_dir = plugin_dir.join("data").join("abilities");
        create_dir(&payloads_dir)?;
        create_dir(&abilities_dir)?;

        let mut summary = SyncSummary {
            plugin_dir: plugin_dir.clone(),
            ..SyncSummary::default()
        };
        let mut procedures = Vec::new();

        for path in self.layout.procedure_files()? {
            let procedure = match load_procedure(&path) {
                Ok(procedure) => procedure,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load procedure");
                    summary.failed.push((path, e.to_string()));
                    continue;
                }
            };

            let script = self.layout.script_path(&procedure);
            if !script.exists() {
                warn!("{}.sh not found, run build first", procedure.name());
                summary.skipped.push(procedure.name().to_string());
                procedures.push(procedure);
                continue;
            }

            match self.sync_one(&procedure, &script, &payloads_dir, &abilities_dir) {
                Ok(ability) => {
                    info!(ability = %ability.display(), "created ability for {}", procedure.name());
                    summary.payloads += 1;
                    summary.abilities.push(ability);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to sync procedure");
                    summary.failed.push((path, e.to_string()));
                }
            }
            procedures.push(procedure);
        }

        let docs_dir = plugin_dir.join("docs");
        create_dir(&docs_dir)?;
        let docs = docs_dir.join("abilities.md");
        std::fs::write(&docs, abilities_reference(&procedures)).map_err(|e| BuildError::io_error(&docs, e))?;
        info!(path = %docs.display(), "abilities reference updated");
        summary.docs = Some(docs);

        Ok(summary)
    }

    fn sync_one(
        &self,
        procedure: &Procedure,
        script: &Path,
        payloads_dir: &Path,
        abilities_dir: &Path,
    ) -> BuildResult<PathBuf> {
        let payload = payloads_dir.join(format!("{}.sh", procedure.name()));
        std::fs::copy(script, &payload).map_err(|e| BuildError::io_error(&payload, e))?;

        let ability = Ability::for_procedure(procedure);
        let tactic_dir = abilities_dir.join(procedure.tactic().directory());
        create_dir(&tactic_dir)?;
        let path = tactic_dir.join(format!("{}.yml", ability.id));
        std::fs::write(&path, ability.to_yaml()?).map_err(|e| BuildError::io_error(&path, e))?;
        Ok(path)
    }
}

fn create_dir(path: &Path) -> BuildResult<()> {
    std::fs::create_dir_all(path).map_err(|e| BuildError::io_error(path, e))
}

/// Markdown reference of abilities grouped by tactic
#[must_use]
pub fn abilities_reference(procedures: &[Procedure]) -> String {
    let mut by_tactic: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for procedure in procedures {
        let mut entry = vec![
            format!("### {}", procedure.name()),
            procedure.intent().to_string(),
            String::new(),
            "| Property | Value |".to_string(),
            "|----------|-------|".to_string(),
            format!("| Technique | {} |", procedure.ttp_id()),
            "| Platform | darwin |".to_string(),
            "| Executor | sh |".to_string(),
            String::new(),
            "| Argument | Description |".to_string(),
            "|----------|-------------|".to_string(),
        ];
        for arg in procedure.arguments() {
            entry.push(format!("| `{}` | {} |", arg.option.long(), arg.description));
        }
        entry.push(String::new());
        by_tactic.entry(procedure.tactic_name()).or_default().push(entry.join("\n"));
    }

    let mut lines = vec!["# Abilities Reference".to_string(), String::new()];
    for (tactic, entries) in by_tactic {
        lines.push(format!("## {tactic}"));
        lines.push(String::new());
        lines.extend(entries);
    }
    lines.join("\n")
}
