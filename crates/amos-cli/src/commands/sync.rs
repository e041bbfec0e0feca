//! `sync-caldera` and `sync-docs`

use crate::style::{paint, Style};
use amos_build::{CalderaSync, ProjectLayout};
use amos_codegen::BaseTemplate;
use amos_docs::sync_function_docs;
use anyhow::Context;

/// Copy built scripts and abilities into the Caldera plugin
pub(crate) fn sync_caldera(layout: &ProjectLayout) -> anyhow::Result<bool> {
    println!(
        "\n{}",
        paint(Style::Bold, "Syncing to Caldera plugin (one ability per script)")
    );
    let summary = CalderaSync::new(layout).run().context("Caldera sync failed")?;

    for name in &summary.skipped {
        println!("{} {name}.sh not found, run build first", paint(Style::Yellow, "SKIP:"));
    }
    for ability in &summary.abilities {
        if let Some(name) = ability.file_name() {
            println!("{} {}", paint(Style::Bold, "Created:"), name.to_string_lossy());
        }
    }
    for (path, reason) in &summary.failed {
        println!(
            "{} Failed to sync {}: {reason}",
            paint(Style::Red, "ERROR:"),
            path.display()
        );
    }

    println!("\n{}", paint(Style::Bold, "SYNC COMPLETE:"));
    println!("  Payloads copied: {}", summary.payloads);
    println!("  Abilities generated: {}", summary.abilities.len());
    if summary.docs.is_some() {
        println!("  Documentation synced");
    }
    println!("  Location: {}", summary.plugin_dir.display());

    if summary.abilities.is_empty() {
        if !summary.failed.is_empty() {
            println!("\n{}", paint(Style::Red, "No abilities generated due to errors."));
            println!("Check the error messages above and fix the YAML files.");
        }
    } else {
        println!("\n{}", paint(Style::Bold, "Next steps:"));
        println!("  1. Copy plugin to your Caldera instance");
        println!("  2. Add 'attackmacos' to your Caldera config");
        println!("  3. Rebuild Caldera Docker container");
    }
    Ok(summary.failed.is_empty())
}

/// Refresh function pages from the base template
pub(crate) fn sync_docs(layout: &ProjectLayout) -> anyhow::Result<bool> {
    let template = BaseTemplate::load_or_embedded(layout.base_template())
        .context("failed to load base template")?;
    let docs_dir = layout.function_docs_dir();
    let report = sync_function_docs(template.text(), &docs_dir)
        .with_context(|| format!("failed to sync docs into {}", docs_dir.display()))?;

    println!("\n{}", paint(Style::Bold, "SYNC SUMMARY:"));
    println!("  Total functions: {}", report.total);
    println!("  Created: {}", report.created);
    println!("  Updated: {}", report.updated);
    println!("  Unchanged: {}", report.unchanged);
    if report.failed > 0 {
        println!("  Failed: {}", report.failed);
    }
    println!("  Location: {}", docs_dir.display());
    Ok(report.failed == 0)
}
