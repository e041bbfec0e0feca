//! amos ATT&CK analysis
//!
//! Queries over the MITRE ATT&CK enterprise STIX bundle:
//!
//! - **Dataset**: techniques by platform, content search with context
//! - **Matrix**: per-tactic coverage page for the project's procedures
//! - **Relations**: dependency graph and related-technique reports mined
//!   from description prose
//!
//! # Example
//!
//! ```rust,ignore
//! use amos_attack::{AttackDataset, Coverage, CoverageMatrix};
//!
//! let dataset = AttackDataset::load("enterprise-attack.json")?;
//! let page = CoverageMatrix::new("macOS").render(&dataset, &Coverage::new());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod coverage;
pub mod error;
pub mod matrix;
pub mod relations;
pub mod stix;

pub use coverage::{CellStatus, Coverage};
pub use error::{AttackError, AttackResult};
pub use matrix::{CoverageMatrix, MatrixStats, DEFAULT_PLATFORM, PROCEDURES_PER_TECHNIQUE};
pub use relations::{
    extract_dependencies, related_to, DependencyGraph, RelatedReport, Relation,
    DEPENDENCY_PHRASES, RELATION_PHRASES,
};
pub use stix::{
    context_lines, group_by_tactic, highlight, AttackDataset, AttackPattern, StixObject,
    ATTACK_PATTERN,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
