//! `convert-loobin`

use crate::style::{paint, Style};
use amos_build::ProjectLayout;
use amos_convert::{convert, load_template, output_path, write_procedure, LoobinEntry};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Convert one LOOBins entry
pub(crate) fn convert_loobin(
    layout: &ProjectLayout,
    loobin: &Path,
    template: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> anyhow::Result<bool> {
    let entry = LoobinEntry::load(loobin).with_context(|| format!("failed to load {}", loobin.display()))?;
    let template_path = template.cloned().unwrap_or_else(|| layout.procedure_template());
    let template = load_template(&template_path)
        .with_context(|| format!("failed to load template {}", template_path.display()))?;

    let doc = convert(template, &entry).context("conversion failed")?;
    let output = output.cloned().unwrap_or_else(|| output_path(loobin));
    write_procedure(&doc, &output).with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{} {} -> {}",
        paint(Style::Green, "Converted:"),
        loobin.display(),
        output.display()
    );
    println!("  Use cases: {}", entry.example_use_cases.len());
    Ok(true)
}
