//! Manifest reconciliation
//!
//! Records are processed strictly in manifest order, one at a time. For each
//! record that passes the [`RunFilter`]:
//!
//! 1. the record is validated; an invalid record is reported as
//!    misconfigured,
//! 2. a valid record is dispatched to its manager adapter,
//! 3. its file operations are materialized, whatever happened in 1 and 2.

use boot_fs::{ApplyMode, EnvSnapshot, Materializer, PathResolver};
use boot_managers::{AppxAdapter, CommandRunner, ScoopAdapter, WingetAdapter};
use tracing::{debug, error, info, warn};

use crate::{
    Manager, Manifest, PackageRecord, RecordReport, RecordSpec, Result, RunFilter, RunReport,
    Settings, StepAction, StepReport,
};

/// Drives a manifest against the machine.
pub struct Reconciler<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
    env: &'a EnvSnapshot,
    mode: ApplyMode,
}

struct Adapters<'a> {
    scoop: ScoopAdapter<'a>,
    winget: WingetAdapter<'a>,
    appx: AppxAdapter<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        settings: &'a Settings,
        env: &'a EnvSnapshot,
        mode: ApplyMode,
    ) -> Self {
        Self {
            runner,
            settings,
            env,
            mode,
        }
    }

    /// Process every record in scope and report what happened.
    ///
    /// Only setup problems (an unusable winget pattern) are returned as
    /// errors. Record and file failures end up in the report.
    pub fn run(&self, manifest: &Manifest, filter: &RunFilter) -> Result<RunReport> {
        let tools = &self.settings.tools;
        let adapters = Adapters {
            scoop: ScoopAdapter::new(self.runner, tools, self.mode),
            winget: WingetAdapter::new(self.runner, tools, self.mode)
                .with_oracle(self.settings.winget_oracle()?),
            appx: AppxAdapter::new(self.runner, tools, self.mode),
        };
        let resolver = PathResolver::new(self.env).with_policy(self.settings.resolve_policy());
        let materializer = Materializer::new(resolver, self.mode);

        let mut report = RunReport {
            dry_run: self.mode.is_dry_run(),
            ..Default::default()
        };

        for spec in manifest.records() {
            if !filter.matches(spec) {
                debug!(package = %spec.package, "Out of scope, skipping");
                report.skipped += 1;
                continue;
            }
            report.records.push(self.process(spec, &adapters, &materializer));
        }

        info!(
            processed = report.records.len(),
            skipped = report.skipped,
            "Run finished"
        );
        Ok(report)
    }

    fn process(
        &self,
        spec: &RecordSpec,
        adapters: &Adapters<'_>,
        materializer: &Materializer<'_>,
    ) -> RecordReport {
        let mut report = RecordReport {
            package: spec.package.clone(),
            manager: spec.manager.name.clone(),
            steps: Vec::new(),
            error: None,
            misconfigured: false,
            files: Vec::new(),
        };

        match spec.validate() {
            Ok(record) => {
                if let Err(e) = dispatch(&record, adapters, &mut report.steps) {
                    error!(package = %record.package, error = %e, "Package step failed");
                    report.error = Some(e.to_string());
                }
            }
            Err(e) => {
                warn!(package = %spec.package, error = %e, "Misconfigured record");
                report.misconfigured = true;
                report.error = Some(e.to_string());
            }
        }

        report.files = materializer.materialize(spec.file_operations());
        report
    }
}

/// Run the manager steps for one record, collecting each completed step.
fn dispatch(
    record: &PackageRecord,
    adapters: &Adapters<'_>,
    steps: &mut Vec<StepReport>,
) -> boot_managers::Result<()> {
    let package = record.package.as_str();
    debug!(package, manager = %record.manager.kind(), workspace = %record.workspace, "Dispatching");
    match &record.manager {
        Manager::Scoop { bucket } => {
            let outcome = adapters.scoop.ensure_bucket(bucket)?;
            steps.push(step(StepAction::Bucket, bucket, outcome));
            let outcome = adapters.scoop.ensure_installed(package)?;
            steps.push(step(StepAction::Install, package, outcome));
        }
        Manager::Winget => {
            let outcome = adapters.winget.ensure_installed(package)?;
            steps.push(step(StepAction::Install, package, outcome));
        }
        Manager::Appx => {
            let outcome = adapters.appx.ensure_absent(package)?;
            steps.push(step(StepAction::Remove, package, outcome));
        }
    }
    Ok(())
}

fn step(action: StepAction, target: &str, outcome: boot_managers::Outcome) -> StepReport {
    StepReport {
        action,
        target: target.to_string(),
        outcome,
    }
}
