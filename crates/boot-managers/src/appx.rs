//! Appx adapter: removal of preinstalled Windows app packages

use tracing::{debug, info};

use crate::runner::execute;
use crate::{ApplyMode, CommandRunner, Outcome, Result, ToolPaths, powershell};

/// Removes app packages through the PowerShell Appx cmdlets.
pub struct AppxAdapter<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    mode: ApplyMode,
}

impl<'a> AppxAdapter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tools: &ToolPaths, mode: ApplyMode) -> Self {
        Self {
            runner,
            program: tools.powershell.clone(),
            mode,
        }
    }

    /// Full names of installed packages matching `name`.
    pub fn installed(&self, name: &str) -> Result<Vec<String>> {
        let script = format!(
            "Get-AppxPackage -Name {} | Select-Object -ExpandProperty PackageFullName",
            powershell::quote(name)
        );
        let output = execute(self.runner, &powershell::script(&self.program, script))?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Make sure no package matching `name` is installed.
    pub fn ensure_absent(&self, name: &str) -> Result<Outcome> {
        let full_names = self.installed(name)?;
        if full_names.is_empty() {
            debug!(package = name, "Not installed, nothing to remove");
            return Ok(Outcome::AlreadyAbsent);
        }

        if self.mode.is_dry_run() {
            return Ok(Outcome::WouldRemove);
        }

        for full_name in &full_names {
            info!(package = name, full_name = %full_name, "Removing app package");
            let script = format!("Remove-AppxPackage -Package {}", powershell::quote(full_name));
            execute(self.runner, &powershell::script(&self.program, script))?;
        }
        Ok(Outcome::Removed)
    }
}
