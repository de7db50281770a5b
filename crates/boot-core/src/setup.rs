//! One-time machine setup
//!
//! Prepares a fresh machine for manifest runs: installs scoop, the aria2
//! download accelerator, the shell runtime, and a logon task that keeps the
//! aria2 RPC daemon running. Every step is idempotent. A failing step is
//! logged and reported, and the next step still runs.

use boot_fs::ApplyMode;
use boot_managers::{
    CommandRunner, Outcome, ScoopAdapter, TaskScheduler, WingetAdapter, is_elevated, powershell,
    runner::execute,
};
use serde::Serialize;
use tracing::{error, info};

use crate::{Error, Result, Settings};

const SCOOP_INSTALLER: &str = "irm get.scoop.sh -outfile install.ps1; .\\install.ps1 -RunAsAdmin";
const ARIA2: &str = "aria2";
const ARIA2_WARNING: &str = "aria2-warning-enabled";

/// Result of one setup step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupStep {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SetupStep {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub dry_run: bool,
    pub steps: Vec<SetupStep>,
}

impl SetupReport {
    pub fn step(&self, name: &str) -> Option<&SetupStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| s.failed()).count()
    }
}

/// Runs the setup steps in order.
pub struct MachineSetup<'a> {
    runner: &'a dyn CommandRunner,
    settings: &'a Settings,
    mode: ApplyMode,
}

impl<'a> MachineSetup<'a> {
    pub fn new(runner: &'a dyn CommandRunner, settings: &'a Settings, mode: ApplyMode) -> Self {
        Self {
            runner,
            settings,
            mode,
        }
    }

    /// Run all steps. Fails only when the shell is not elevated.
    pub fn run(&self) -> Result<SetupReport> {
        if !is_elevated(self.runner) {
            return Err(Error::NotElevated);
        }

        let tools = &self.settings.tools;
        let setup = &self.settings.setup;
        let scoop = ScoopAdapter::new(self.runner, tools, self.mode);
        let winget = WingetAdapter::new(self.runner, tools, self.mode)
            .with_oracle(self.settings.winget_oracle()?);
        let tasks = TaskScheduler::new(self.runner, tools, self.mode);

        let mut report = SetupReport {
            dry_run: self.mode.is_dry_run(),
            steps: Vec::new(),
        };

        report.steps.push(record("scoop", self.bootstrap_scoop(&scoop)));
        report.steps.push(record(
            ARIA2,
            scoop.ensure_installed(ARIA2).and_then(|installed| {
                let configured = scoop.ensure_config(ARIA2_WARNING, "false")?;
                Ok(if installed.is_change() || installed.is_pending() {
                    installed
                } else {
                    configured
                })
            }),
        ));
        report.steps.push(record(
            &setup.shell_package,
            winget.ensure_installed(&setup.shell_package),
        ));

        let action = format!("{} {}", setup.aria2_command, setup.aria2_args);
        report.steps.push(record(
            &setup.task_name,
            tasks.ensure_logon_task(&setup.task_name, action.trim()),
        ));

        info!(failures = report.failures(), "Setup finished");
        Ok(report)
    }

    fn bootstrap_scoop(&self, scoop: &ScoopAdapter<'_>) -> boot_managers::Result<Outcome> {
        if scoop.is_available() {
            return Ok(Outcome::AlreadyPresent);
        }
        if self.mode.is_dry_run() {
            return Ok(Outcome::WouldInstall);
        }

        info!("Installing scoop");
        let command = powershell::script(&self.settings.tools.powershell, SCOOP_INSTALLER);
        execute(self.runner, &command)?;
        Ok(Outcome::Installed)
    }
}

fn record(name: &str, result: boot_managers::Result<Outcome>) -> SetupStep {
    match result {
        Ok(outcome) => SetupStep {
            name: name.to_string(),
            outcome: Some(outcome),
            error: None,
        },
        Err(e) => {
            error!(step = name, error = %e, "Setup step failed");
            SetupStep {
                name: name.to_string(),
                outcome: None,
                error: Some(e.to_string()),
            }
        }
    }
}
