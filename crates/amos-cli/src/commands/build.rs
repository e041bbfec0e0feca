//! `build` and `validate`

use crate::style::{paint, Style};
use amos_build::{BuildError, BuildOutcome, Builder, CheckOutcome, Disposition};
use amos_procedure::ValidationReport;
use anyhow::Context;
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

pub(crate) fn print_violations(report: &ValidationReport) {
    for violation in &report.violations {
        println!("Error: {}", violation.message);
        if !violation.location.is_empty() {
            println!("Location: {}", violation.location);
        }
        if let Some(hint) = &violation.hint {
            println!("{} {hint}", paint(Style::Bold, "Fix:"));
        }
    }
}

fn print_outcome(outcome: &BuildOutcome) {
    let bold = |s: &str| paint(Style::Bold, s);
    let script = outcome.script_path.display();
    match outcome.disposition {
        Disposition::New => println!("{} {script}", bold("Creating new script:")),
        Disposition::Overwrite => println!("{} {script}", bold("Force overwriting:")),
        Disposition::Version(n) => println!("{} {script}", bold(&format!("Creating version {n}:"))),
    }
    if let Some((old, new)) = &outcome.version_bump {
        println!("{} Updated version {old} -> {new}", bold("Force mode:"));
    }
    let check = if outcome.shellcheck { "PASSED (sh -n + shellcheck)" } else { "PASSED (sh -n)" };
    println!("{} {check}", bold("Syntax check:"));
    match &outcome.stamp {
        Some(stamp) => {
            println!("{} {}", bold("GUID generated:"), stamp.guid);
            println!("{} {}", bold("Updated date:"), stamp.date);
        }
        None => println!(
            "{} GUID update failed, but script is functional",
            paint(Style::Yellow, "WARNING:")
        ),
    }
    if let Some(test) = &outcome.test_script {
        println!("{} {}", bold("Test created:"), file_name(test));
    }
    println!(
        "{} {}",
        paint(Style::Green, "BUILD SUCCESS:"),
        file_name(&outcome.script_path)
    );
    println!("{} {script}", bold("Location:"));
}

fn print_failure(path: &Path, error: &BuildError) {
    match error {
        BuildError::Validation { report, .. } => {
            println!("\n{} {}", paint(Style::Red, "VALIDATION FAILED:"), file_name(path));
            print_violations(report);
        }
        BuildError::CheckFailed { path: script, outcome } => {
            println!("{} {} - shell checks failed", paint(Style::Red, "BUILD FAILED:"), file_name(script));
            match outcome {
                CheckOutcome::SyntaxError(stderr) => println!("Error: {}", stderr.trim()),
                CheckOutcome::ShellcheckErrors(report) => {
                    println!("{}", report.trim());
                    println!(
                        "{} These are functional errors that will break the script",
                        paint(Style::Bold, "Note:")
                    );
                }
                CheckOutcome::Passed { .. } => {}
            }
        }
        other => {
            println!("\n{} {}", paint(Style::Red, "BUILD FAILED:"), file_name(path));
            println!("Error: {other}");
        }
    }
}

/// Build one YAML file
pub(crate) async fn build_one(builder: &Builder, yaml: &Path, force: bool) -> bool {
    match builder.build(yaml, force).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            true
        }
        Err(e) => {
            print_failure(yaml, &e);
            false
        }
    }
}

/// Build every pending procedure, or all with `force`
pub(crate) async fn build_all(builder: &Builder, force: bool) -> anyhow::Result<bool> {
    let summary = builder.build_all(force).await.context("failed to list procedures")?;
    if summary.built.is_empty() && summary.failed.is_empty() {
        println!("All YAML files already have corresponding scripts.");
        return Ok(true);
    }
    for outcome in &summary.built {
        print_outcome(outcome);
    }
    for (path, reason) in &summary.failed {
        println!("\n{} {}", paint(Style::Red, "BUILD FAILED:"), file_name(path));
        println!("Error: {reason}");
    }
    println!("\n{}", paint(Style::Bold, "BUILD SUMMARY:"));
    println!("  Built: {} scripts", summary.built.len());
    if !summary.failed.is_empty() {
        println!("  Failed: {} scripts", summary.failed.len());
    }
    Ok(summary.is_success())
}

/// Validate one YAML file
pub(crate) fn validate(builder: &Builder, yaml: &Path) -> anyhow::Result<bool> {
    let report = builder
        .validate(yaml)
        .with_context(|| format!("failed to load {}", yaml.display()))?;
    if report.is_valid() {
        println!("{} {}", paint(Style::Green, "VALIDATION PASSED:"), file_name(yaml));
        Ok(true)
    } else {
        println!("{} {}", paint(Style::Red, "VALIDATION FAILED:"), file_name(yaml));
        print_violations(&report);
        Ok(false)
    }
}
