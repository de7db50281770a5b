//! Windows Task Scheduler adapter

use tracing::{debug, info};

use crate::runner::{execute, query};
use crate::{ApplyMode, CommandRunner, CommandSpec, Outcome, Result, ToolPaths};

/// Registers logon tasks through `schtasks`.
pub struct TaskScheduler<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    mode: ApplyMode,
}

impl<'a> TaskScheduler<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tools: &ToolPaths, mode: ApplyMode) -> Self {
        Self {
            runner,
            program: tools.schtasks.clone(),
            mode,
        }
    }

    /// `schtasks /Query` fails for unknown task names.
    pub fn exists(&self, name: &str) -> Result<bool> {
        let command = CommandSpec::new(&self.program).args(["/Query", "/TN", name]);
        Ok(query(self.runner, &command)?.success())
    }

    /// Make sure a task `name` runs `action` at every logon with highest
    /// privileges.
    pub fn ensure_logon_task(&self, name: &str, action: &str) -> Result<Outcome> {
        if self.exists(name)? {
            debug!(task = name, "Scheduled task already registered");
            return Ok(Outcome::AlreadyPresent);
        }

        if self.mode.is_dry_run() {
            return Ok(Outcome::WouldAdd);
        }

        info!(task = name, action, "Registering scheduled task");
        let command = CommandSpec::new(&self.program).args([
            "/Create", "/TN", name, "/TR", action, "/SC", "ONLOGON", "/RL", "HIGHEST", "/F",
        ]);
        execute(self.runner, &command)?;
        Ok(Outcome::Added)
    }
}
