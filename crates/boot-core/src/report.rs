//! Run results

use boot_fs::FileReport;
use boot_managers::Outcome;
use serde::Serialize;

/// What a package step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Bucket,
    Install,
    Remove,
}

/// One adapter call and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub action: StepAction,
    pub target: String,
    pub outcome: Outcome,
}

/// Overall state of one record after processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Something on the machine was changed
    Changed,
    /// Desired state already held
    Unchanged,
    /// Dry run found work to do
    Pending,
    /// A package step or file operation failed
    Failed,
    /// The record itself is invalid
    Misconfigured,
}

/// Result of processing one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    pub package: String,
    pub manager: String,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub misconfigured: bool,
    pub files: Vec<FileReport>,
}

impl RecordReport {
    pub fn status(&self) -> RecordStatus {
        if self.misconfigured {
            return RecordStatus::Misconfigured;
        }
        if self.error.is_some() || self.files.iter().any(|f| f.outcome.is_failure()) {
            return RecordStatus::Failed;
        }

        let changed = self.steps.iter().any(|s| s.outcome.is_change())
            || self.files.iter().any(|f| f.outcome.is_change());
        if changed {
            return RecordStatus::Changed;
        }

        let pending = self.steps.iter().any(|s| s.outcome.is_pending())
            || self.files.iter().any(|f| {
                matches!(
                    f.outcome,
                    boot_fs::FileOutcome::WouldCopy | boot_fs::FileOutcome::WouldLink
                )
            });
        if pending {
            RecordStatus::Pending
        } else {
            RecordStatus::Unchanged
        }
    }
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub processed: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub pending: usize,
    pub failed: usize,
    pub misconfigured: usize,
    pub skipped: usize,
}

/// Result of a whole run, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub records: Vec<RecordReport>,
    /// Records excluded by the run filter
    pub skipped: usize,
}

impl RunReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            processed: self.records.len(),
            skipped: self.skipped,
            ..Default::default()
        };
        for record in &self.records {
            match record.status() {
                RecordStatus::Changed => summary.changed += 1,
                RecordStatus::Unchanged => summary.unchanged += 1,
                RecordStatus::Pending => summary.pending += 1,
                RecordStatus::Failed => summary.failed += 1,
                RecordStatus::Misconfigured => summary.misconfigured += 1,
            }
        }
        summary
    }

    pub fn record(&self, package: &str) -> Option<&RecordReport> {
        self.records.iter().find(|r| r.package == package)
    }
}
