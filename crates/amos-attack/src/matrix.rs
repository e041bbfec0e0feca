//! Procedure coverage matrix
//!
//! Renders a GitHub-flavoured markdown page: summary badges, one column
//! per tactic in matrix order, and one shields.io badge per technique
//! coloured by its [`CellStatus`].

use crate::coverage::{CellStatus, Coverage};
use crate::stix::{group_by_tactic, AttackDataset};
use amos_procedure::Tactic;
use std::fmt::Write as _;

/// Procedures assumed to exist per technique when estimating coverage
pub const PROCEDURES_PER_TECHNIQUE: usize = 20;

/// Platform rendered when none is given
pub const DEFAULT_PLATFORM: &str = "macOS";

const SHIELDS: &str = "https://img.shields.io/badge";

/// Headline numbers of a matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixStats {
    /// Active techniques on the platform
    pub total_techniques: usize,
    /// Techniques with a built procedure
    pub implemented_techniques: usize,
    /// Built procedures
    pub implemented_procedures: u32,
    /// `total_techniques` times [`PROCEDURES_PER_TECHNIQUE`]
    pub estimated_procedures: usize,
    /// Percent of techniques covered
    pub technique_coverage: f64,
    /// Percent of estimated procedures covered
    pub procedure_coverage: f64,
}

impl MatrixStats {
    #[allow(clippy::cast_precision_loss)]
    fn new(total_techniques: usize, coverage: &Coverage) -> Self {
        let implemented_techniques = coverage.implemented_techniques();
        let implemented_procedures = coverage.implemented_procedures();
        let estimated_procedures = total_techniques * PROCEDURES_PER_TECHNIQUE;
        Self {
            total_techniques,
            implemented_techniques,
            implemented_procedures,
            estimated_procedures,
            technique_coverage: percent(implemented_techniques as f64, total_techniques),
            procedure_coverage: percent(f64::from(implemented_procedures), estimated_procedures),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: f64, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part / whole as f64 * 100.0
    }
}

/// Markdown coverage matrix for one platform
#[derive(Debug, Clone)]
pub struct CoverageMatrix {
    platform: String,
}

impl Default for CoverageMatrix {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM)
    }
}

impl CoverageMatrix {
    /// Matrix over techniques listing `platform`
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    /// Platform name as matched against `x_mitre_platforms`
    #[inline]
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Headline numbers without rendering
    #[must_use]
    pub fn stats(&self, dataset: &AttackDataset, coverage: &Coverage) -> MatrixStats {
        MatrixStats::new(dataset.techniques_by_platform(&self.platform, true).len(), coverage)
    }

    /// Render the full page
    #[must_use]
    pub fn render(&self, dataset: &AttackDataset, coverage: &Coverage) -> String {
        let techniques = dataset.techniques_by_platform(&self.platform, true);
        let tactics = group_by_tactic(&techniques);
        let stats = MatrixStats::new(techniques.len(), coverage);
        tracing::debug!(
            platform = %self.platform,
            techniques = stats.total_techniques,
            implemented = stats.implemented_techniques,
            "rendering coverage matrix"
        );

        let order = Tactic::MATRIX_ORDER;
        let columns: Vec<(&str, &[(String, String)])> = order
            .iter()
            .map(|tactic| {
                let cells = tactics.get(&tactic.phase_name()).map_or(&[][..], Vec::as_slice);
                (tactic.display_name(), cells)
            })
            .collect();

        let mut out = String::new();
        self.write_header(&mut out, &stats);

        let headers: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let _ = writeln!(out, "| {} |", headers.join(" | "));
        let _ = writeln!(out, "| {} |", vec!["---"; columns.len()].join(" | "));

        let rows = columns.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        for i in 0..rows {
            let row: Vec<String> = columns
                .iter()
                .map(|(_, cells)| cells.get(i).map_or_else(String::new, |(id, name)| cell(id, name, coverage)))
                .collect();
            let _ = writeln!(out, "| {} |", row.join(" | "));
        }

        let _ = writeln!(out, "\n## Technique Counts per Tactic");
        for (name, cells) in &columns {
            let _ = writeln!(out, "- {name}: {}", cells.len());
        }
        out
    }

    fn write_header(&self, out: &mut String, stats: &MatrixStats) {
        let platform = &self.platform;
        let _ = writeln!(out, "<div align=\"center\">\n");
        let _ = writeln!(out, "# **{platform} Attack Procedure Matrix**\n");
        let _ = writeln!(
            out,
            "<p>The Matrix contains information for the {platform} platform</br>The number of possible procedures per technique is vast. These statistics use conservative estimates for coverage calculations.</p>\n"
        );
        let _ = writeln!(out, "</div>\n\n");
        let _ = writeln!(out, "<div align=\"center\">\n");
        let _ = writeln!(
            out,
            "![Technique Coverage]({SHIELDS}/Technique%20Coverage-{}%20({:.2}%25)-grey?style=for-the-badge)",
            stats.implemented_techniques, stats.technique_coverage
        );
        let _ = writeln!(
            out,
            "![Known Techniques]({SHIELDS}/Known%20Techniques-{}-red?style=for-the-badge)",
            stats.total_techniques
        );
        let _ = writeln!(
            out,
            "![Procedure Coverage]({SHIELDS}/Procedure%20Coverage-{}%20({:.2}%25)-grey?style=for-the-badge)",
            stats.implemented_procedures, stats.procedure_coverage
        );
        let _ = writeln!(
            out,
            "![Estimated Known Procedures]({SHIELDS}/Estimated%20Known%20Procedures-{}-grey?style=for-the-badge)",
            stats.estimated_procedures
        );
        let _ = writeln!(out, "\n</div>");
        let _ = writeln!(out, "<div align=\"center\">\n");
        let _ = writeln!(out, "</div>\n");
        let _ = writeln!(out, "##\n");
    }
}

fn cell(id: &str, name: &str, coverage: &Coverage) -> String {
    let (label, colors) = match coverage.status(id) {
        CellStatus::Green(count) => (
            format!("-lightgrey?style=for-the-badge&label=%20{count}%20"),
            "&labelColor=3bc05a&color=494949",
        ),
        CellStatus::Yellow => (
            "-lightgrey?style=for-the-badge&label=%20!%20".to_string(),
            "&labelColor=ffde59&color=494949",
        ),
        CellStatus::Red => (
            "-lightgrey?style=for-the-badge&label=%20-%20".to_string(),
            "&labelColor=EB5454&color=494949",
        ),
    };
    let alt = match coverage.script(id) {
        Some(script) => format!("[{id}](../../{script})"),
        None => id.to_string(),
    };
    format!("![{alt}]({SHIELDS}/{id}{label}{colors})</br><sub>{name}</sub>")
}
