//! Technique relationships mined from descriptions
//!
//! ATT&CK descriptions mention other techniques in prose ("... relies on
//! [Command and Scripting Interpreter](.../T1059)"). Dependencies use a
//! short list of strong phrases; relations to a target technique use a
//! broader list.

use crate::stix::AttackDataset;
use once_cell::sync::Lazy;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// Technique id pattern, `T1059` or `T1548.001`
pub const TECHNIQUE_ID_PATTERN: &str = r"T\d+(?:\.\d+)?";

/// Edge label in the dependency graph
pub const DEPENDS_ON: &str = "depends_on";

/// Phrases that mark a hard dependency
pub const DEPENDENCY_PHRASES: [&str; 4] = ["depends on", "relies on", "requires", "is a prerequisite for"];

/// Phrases that relate one technique to another
pub const RELATION_PHRASES: [&str; 22] = [
    "uses",
    "leverages",
    "relies on",
    "depends on",
    "requires",
    "involve manipulating",
    "and abuse",
    "involves abusing",
    "is facilitated by",
    "enables",
    "can be used for",
    "may use",
    "involve using",
    "may leverage",
    "may be used in conjunction with",
    "supports",
    "often uses",
    "frequently leverages",
    "additional techniques like",
    "resources using",
    "with administrator-level",
    "other attack techniques like",
];

static TECHNIQUE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(TECHNIQUE_ID_PATTERN).expect("technique id regex is valid"));

/// `(technique, related)` pairs where a technique mentioned in
/// `description` is followed by a dependency phrase and another id; only
/// the first matching phrase counts per mention
#[must_use]
pub fn extract_dependencies(description: &str) -> Vec<(String, String)> {
    let mut edges = Vec::new();
    for technique in TECHNIQUE_ID.find_iter(description) {
        let technique = technique.as_str();
        for phrase in DEPENDENCY_PHRASES {
            let pattern = format!(
                "(?i){}.*{}.*({TECHNIQUE_ID_PATTERN})",
                regex::escape(technique),
                regex::escape(phrase)
            );
            let Ok(re) = Regex::new(&pattern) else {
                continue;
            };
            if let Some(related) = re.captures(description).and_then(|caps| caps.get(1)) {
                edges.push((technique.to_string(), related.as_str().to_string()));
                break;
            }
        }
    }
    edges
}

/// Dependency graph over every technique in a dataset
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, &'static str>,
    nodes: HashMap<String, NodeIndex>,
    names: HashMap<String, String>,
}

impl DependencyGraph {
    /// Build from all attack patterns, revoked ones included
    #[must_use]
    pub fn build(dataset: &AttackDataset) -> Self {
        let mut graph = Self::default();
        for technique in dataset.attack_patterns() {
            let Some(id) = technique.attack_id() else {
                continue;
            };
            graph.node(id);
            graph.names.insert(id.to_string(), technique.name.clone());
            for (source, target) in extract_dependencies(&technique.description) {
                let source = graph.node(&source);
                let target = graph.node(&target);
                graph.graph.update_edge(source, target, DEPENDS_ON);
            }
        }
        tracing::debug!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(index) = self.nodes.get(id) {
            return *index;
        }
        let index = self.graph.add_node(id.to_string());
        self.nodes.insert(id.to_string(), index);
        index
    }

    /// Number of techniques, including ids only seen in descriptions
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct dependency edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Technique name, `None` for ids absent from the dataset
    #[must_use]
    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Incoming edge count
    #[must_use]
    pub fn in_degree(&self, id: &str) -> usize {
        self.nodes.get(id).map_or(0, |index| {
            self.graph.neighbors_directed(*index, Direction::Incoming).count()
        })
    }

    /// Techniques with incoming edges, most first; ties keep dataset order
    #[must_use]
    pub fn top_by_in_degree(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .graph
            .node_indices()
            .map(|index| {
                let degree = self.graph.neighbors_directed(index, Direction::Incoming).count();
                (self.graph[index].as_str(), degree)
            })
            .filter(|(_, degree)| *degree > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Sources of edges into `id`, in dataset order
    #[must_use]
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        let Some(index) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut sources: Vec<NodeIndex> = self.graph.neighbors_directed(*index, Direction::Incoming).collect();
        sources.sort();
        sources.into_iter().map(|s| self.graph[s].as_str()).collect()
    }
}

/// One technique relating to the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Technique whose description holds the mention
    pub technique: String,
    /// Its name
    pub name: String,
    /// Id captured before the phrase
    pub related: String,
    /// Phrase that matched
    pub phrase: &'static str,
}

/// Techniques related to one target technique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedReport {
    /// Technique asked about
    pub target_id: String,
    /// Its name
    pub target_name: String,
    /// Relations in dataset then phrase order
    pub known: Vec<Relation>,
    /// Captured ids that are not in the dataset
    pub unknown: BTreeSet<String>,
    /// Distinct techniques in `known`
    pub total: usize,
}

/// Find descriptions that mention an id, then a relation phrase, then a
/// link to the target by name; `None` when the target is not in the
/// dataset
#[must_use]
pub fn related_to(dataset: &AttackDataset, target_id: &str) -> Option<RelatedReport> {
    let target = dataset.technique(target_id)?;
    let name = regex::escape(&target.name);
    let patterns: Vec<(&'static str, Regex)> = RELATION_PHRASES
        .iter()
        .filter_map(|phrase| {
            let pattern = format!(
                r"(?is)({TECHNIQUE_ID_PATTERN}).*?{}.*?\[{name}\]",
                regex::escape(phrase)
            );
            Regex::new(&pattern).ok().map(|re| (*phrase, re))
        })
        .collect();

    let mut known = Vec::new();
    let mut unknown = BTreeSet::new();
    for technique in dataset.attack_patterns() {
        let Some(id) = technique.attack_id() else {
            continue;
        };
        for (phrase, re) in &patterns {
            for caps in re.captures_iter(&technique.description) {
                let related = &caps[1];
                if related == id {
                    continue;
                }
                if dataset.technique(related).is_none() {
                    unknown.insert(related.to_string());
                } else if related == target_id {
                    known.push(Relation {
                        technique: id.to_string(),
                        name: technique.name.clone(),
                        related: related.to_string(),
                        phrase: *phrase,
                    });
                }
            }
        }
    }

    let total = known.iter().map(|r| r.technique.as_str()).collect::<BTreeSet<_>>().len();
    Some(RelatedReport {
        target_id: target_id.to_string(),
        target_name: target.name.clone(),
        known,
        unknown,
        total,
    })
}
