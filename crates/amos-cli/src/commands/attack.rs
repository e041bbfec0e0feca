//! `attack` reports

use crate::style::{color_enabled, paint, paint_if, Style};
use amos_attack::{context_lines, highlight, related_to, AttackDataset, Coverage, CoverageMatrix, DependencyGraph};
use amos_build::ProjectLayout;
use amos_procedure::load_procedure;
use anyhow::Context;
use std::path::Path;
use tracing::{debug, warn};

fn load_dataset(path: &Path) -> anyhow::Result<AttackDataset> {
    AttackDataset::load(path).with_context(|| format!("failed to load ATT&CK dataset {}", path.display()))
}

/// Coverage of the project's procedures: built scripts green, the rest
/// yellow
fn project_coverage(layout: &ProjectLayout) -> Coverage {
    let mut coverage = Coverage::new();
    let files = match layout.procedure_files() {
        Ok(files) => files,
        Err(e) => {
            debug!(error = %e, "no procedures found, matrix shows dataset only");
            return coverage;
        }
    };
    for path in files {
        match load_procedure(&path) {
            Ok(procedure) => {
                let script = layout.script_path(&procedure);
                let built = script.exists().then(|| {
                    script
                        .strip_prefix(layout.root())
                        .unwrap_or(&script)
                        .to_string_lossy()
                        .replace('\\', "/")
                });
                coverage.record(&procedure, built);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping procedure"),
        }
    }
    coverage
}

/// Print the coverage matrix
pub(crate) fn matrix(
    layout: &ProjectLayout,
    dataset: &Path,
    platform: &str,
    overlay: Option<&Path>,
) -> anyhow::Result<bool> {
    let dataset = load_dataset(dataset)?;
    let mut coverage = project_coverage(layout);
    if let Some(path) = overlay {
        coverage.merge(Coverage::load(path).context("failed to load coverage overlay")?);
    }
    print!("{}", CoverageMatrix::new(platform).render(&dataset, &coverage));
    Ok(true)
}

/// Print objects whose description mentions `term`
pub(crate) fn search(
    dataset: &Path,
    term: &str,
    object_type: Option<&str>,
    include_revoked: bool,
) -> anyhow::Result<bool> {
    let dataset = load_dataset(dataset)?;
    let found = dataset.objects_by_content(term, object_type, !include_revoked);
    let kind = object_type.unwrap_or("objects");
    println!("There are {} {kind} where '{term}' appears in the description.", found.len());

    let color = color_enabled();
    let (open, close) = if color { ("\x1b[1;31m", "\x1b[0m") } else { ("", "") };
    for object in found {
        println!();
        println!("ID: {}", object.attack_id().unwrap_or("N/A"));
        println!("Name: {}", object.name);
        for (i, line) in context_lines(&object.description, term).iter().enumerate() {
            println!(
                "{}: {}",
                paint_if(color, Style::Yellow, &format!("Matching line {}", i + 1)),
                highlight(line, term, open, close)
            );
        }
    }
    Ok(true)
}

/// Print the techniques with the most dependents
pub(crate) fn deps(dataset: &Path, top: usize) -> anyhow::Result<bool> {
    let dataset = load_dataset(dataset)?;
    let graph = DependencyGraph::build(&dataset);
    println!("Dependency relationships for the first {top} techniques with dependencies:");
    for (i, (technique, _)) in graph.top_by_in_degree(top).iter().enumerate() {
        println!("\n{}. {technique} ({}):", i + 1, graph.name(technique).unwrap_or("unknown"));
        for predecessor in graph.predecessors(technique) {
            println!(
                "   - Depends on: {predecessor} ({})",
                graph.name(predecessor).unwrap_or("unknown")
            );
        }
    }
    Ok(true)
}

/// Print techniques related to `technique`
pub(crate) fn related(dataset: &Path, technique: &str) -> anyhow::Result<bool> {
    let dataset = load_dataset(dataset)?;
    let Some(report) = related_to(&dataset, technique) else {
        eprintln!("{} technique {technique} not found in dataset", paint(Style::Red, "ERROR:"));
        return Ok(false);
    };

    println!("Techniques related to {} ({}):", report.target_id, report.target_name);
    for relation in &report.known {
        println!(
            "- {} ({}) {} {}",
            relation.technique, relation.name, relation.phrase, report.target_id
        );
    }
    if !report.unknown.is_empty() {
        println!("\nUnknown technique IDs found in descriptions:");
        for id in &report.unknown {
            println!("- {id}");
        }
    }
    println!("\nTotal techniques related to {}: {}", report.target_id, report.total);
    Ok(true)
}
