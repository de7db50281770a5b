//! Scoop adapter: bucket-based installer

use tracing::{debug, info};

use crate::runner::{execute, query};
use crate::{ApplyMode, CommandRunner, CommandSpec, Outcome, Result, ToolPaths};

/// Drives `scoop` for bucket registration and package installs.
pub struct ScoopAdapter<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    mode: ApplyMode,
}

impl<'a> ScoopAdapter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tools: &ToolPaths, mode: ApplyMode) -> Self {
        Self {
            runner,
            program: tools.scoop.clone(),
            mode,
        }
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.program)
    }

    /// Whether the scoop executable can be run at all.
    pub fn is_available(&self) -> bool {
        query(self.runner, &self.command().arg("--version")).is_ok_and(|output| output.success())
    }

    /// Names of the registered buckets.
    pub fn buckets(&self) -> Result<Vec<String>> {
        let output = execute(self.runner, &self.command().args(["bucket", "list"]))?;
        Ok(parse_bucket_list(&output.stdout))
    }

    /// Make sure bucket `name` is registered.
    pub fn ensure_bucket(&self, name: &str) -> Result<Outcome> {
        if self.buckets()?.iter().any(|b| b.eq_ignore_ascii_case(name)) {
            debug!(bucket = name, "Bucket already registered");
            return Ok(Outcome::AlreadyPresent);
        }

        if self.mode.is_dry_run() {
            return Ok(Outcome::WouldAdd);
        }

        info!(bucket = name, "Adding scoop bucket");
        execute(self.runner, &self.command().args(["bucket", "add", name]))?;
        Ok(Outcome::Added)
    }

    /// `scoop prefix` exits successfully only for installed apps.
    pub fn is_installed(&self, package: &str) -> Result<bool> {
        let output = query(self.runner, &self.command().args(["prefix", package]))?;
        Ok(output.success())
    }

    /// Make sure `package` is installed.
    pub fn ensure_installed(&self, package: &str) -> Result<Outcome> {
        if self.is_installed(package)? {
            debug!(package, "Already installed via scoop");
            return Ok(Outcome::AlreadyPresent);
        }

        if self.mode.is_dry_run() {
            return Ok(Outcome::WouldInstall);
        }

        info!(package, "Installing with scoop");
        execute(self.runner, &self.command().args(["install", package]))?;
        Ok(Outcome::Installed)
    }

    /// Current value of a scoop config key, `None` when unset.
    pub fn config_value(&self, key: &str) -> Result<Option<String>> {
        let output = query(self.runner, &self.command().args(["config", key]))?;
        let value = output.stdout.trim();
        if !output.success() || value.is_empty() {
            return Ok(None);
        }
        Ok(Some(value.to_string()))
    }

    /// Make sure config `key` holds `value`.
    pub fn ensure_config(&self, key: &str, value: &str) -> Result<Outcome> {
        if self.config_value(key)?.as_deref() == Some(value) {
            debug!(key, value, "Scoop config already set");
            return Ok(Outcome::AlreadyPresent);
        }

        if self.mode.is_dry_run() {
            return Ok(Outcome::WouldConfigure);
        }

        info!(key, value, "Setting scoop config");
        execute(self.runner, &self.command().args(["config", key, value]))?;
        Ok(Outcome::Configured)
    }
}

/// Extract bucket names from `scoop bucket list` output.
///
/// Handles both the tabular form (header, dashed rule, rows) and the older
/// one-name-per-line form. Scoop's `WARN`/`ERROR` diagnostics are skipped.
fn parse_bucket_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|first| !matches!(*first, "Name" | "WARN" | "ERROR") && !first.starts_with('-'))
        .map(str::to_string)
        .collect()
}
