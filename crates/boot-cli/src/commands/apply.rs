//! Manifest run: reconcile the filtered records and print the report

use std::path::Path;

use boot_core::{
    Manifest, RecordReport, RecordStatus, Reconciler, RunFilter, RunReport, Settings, StepAction,
    Summary,
};
use boot_fs::{ApplyMode, EnvSnapshot, FileOutcome, FileReport};
use boot_managers::CommandRunner;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct JsonReport<'a> {
    manifest: &'a Path,
    summary: Summary,
    #[serde(flatten)]
    report: &'a RunReport,
}

/// Load `manifest_path`, reconcile it and print the outcome.
///
/// Record-level failures are part of the report and do not make this fail.
pub fn run_manifest(
    runner: &dyn CommandRunner,
    settings: &Settings,
    env: &EnvSnapshot,
    manifest_path: &Path,
    filter: &RunFilter,
    mode: ApplyMode,
    json: bool,
) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;

    if !json {
        let scope = filter
            .workspace
            .map(|w| w.to_string())
            .unwrap_or_else(|| "any".to_string());
        println!(
            "{} {} {} ({} records, workspace {})",
            "=>".blue().bold(),
            if mode.is_dry_run() { "Checking" } else { "Applying" },
            manifest_path.display().to_string().cyan(),
            manifest.records().len(),
            scope.cyan()
        );
    }

    let report = Reconciler::new(runner, settings, env, mode).run(&manifest, filter)?;

    if json {
        let out = JsonReport {
            manifest: manifest.source().unwrap_or(manifest_path),
            summary: report.summary(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for record in &report.records {
        print_record(record);
    }
    println!();
    println!("{}", summary_line(&report.summary(), report.dry_run));
    Ok(())
}

fn status_tag(status: RecordStatus) -> colored::ColoredString {
    match status {
        RecordStatus::Changed => "CHANGED".green().bold(),
        RecordStatus::Unchanged => "OK".green(),
        RecordStatus::Pending => "PENDING".yellow().bold(),
        RecordStatus::Failed => "FAILED".red().bold(),
        RecordStatus::Misconfigured => "INVALID".magenta().bold(),
    }
}

fn print_record(record: &RecordReport) {
    println!(
        "{} {} ({})",
        status_tag(record.status()),
        record.package.bold(),
        record.manager.dimmed()
    );
    for step in &record.steps {
        let action = match step.action {
            StepAction::Bucket => "bucket",
            StepAction::Install => "install",
            StepAction::Remove => "remove",
        };
        println!("   {} {} {}: {}", "-".dimmed(), action, step.target, step.outcome);
    }
    if let Some(error) = &record.error {
        println!("   {} {}", "!".red(), error);
    }
    for file in &record.files {
        println!("   {} {}", "-".dimmed(), file_line(file));
    }
}

fn file_line(file: &FileReport) -> String {
    let destination = file
        .destination
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "?".to_string());
    let outcome = match &file.outcome {
        FileOutcome::Copied => "copied".to_string(),
        FileOutcome::Linked => "linked".to_string(),
        FileOutcome::Unchanged => "up to date".to_string(),
        FileOutcome::WouldCopy => "would copy".to_string(),
        FileOutcome::WouldLink => "would link".to_string(),
        FileOutcome::Failed { message } => format!("failed: {}", message),
    };
    format!("{} -> {}: {}", file.source, destination, outcome)
}

fn summary_line(summary: &Summary, dry_run: bool) -> String {
    let mut parts = vec![
        format!("{} processed", summary.processed),
        format!("{} changed", summary.changed),
        format!("{} unchanged", summary.unchanged),
    ];
    if dry_run {
        parts.push(format!("{} pending", summary.pending));
    }
    parts.push(format!("{} failed", summary.failed));
    parts.push(format!("{} misconfigured", summary.misconfigured));
    parts.push(format!("{} skipped", summary.skipped));
    format!("Summary: {}", parts.join(", "))
}
