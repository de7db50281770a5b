//! winget adapter: direct installer

use tracing::{debug, info};

use crate::oracle::{NotFoundPattern, Presence, PresenceOracle};
use crate::runner::{execute, query};
use crate::{ApplyMode, CommandRunner, CommandSpec, Error, Outcome, Result, ToolPaths};

/// Drives `winget` for exact-id installs.
pub struct WingetAdapter<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    mode: ApplyMode,
    oracle: Box<dyn PresenceOracle + 'a>,
}

impl<'a> WingetAdapter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tools: &ToolPaths, mode: ApplyMode) -> Self {
        Self {
            runner,
            program: tools.winget.clone(),
            mode,
            oracle: Box::new(NotFoundPattern::default()),
        }
    }

    /// Replace the strategy used to read `winget list` output.
    pub fn with_oracle(mut self, oracle: impl PresenceOracle + 'a) -> Self {
        self.oracle = Box::new(oracle);
        self
    }

    fn list_command(&self, id: &str) -> CommandSpec {
        CommandSpec::new(&self.program).args([
            "list",
            "--exact",
            "--id",
            id,
            "--accept-source-agreements",
            "--disable-interactivity",
        ])
    }

    fn install_command(&self, id: &str) -> CommandSpec {
        CommandSpec::new(&self.program).args([
            "install",
            "--exact",
            "--id",
            id,
            "--silent",
            "--accept-package-agreements",
            "--accept-source-agreements",
        ])
    }

    pub fn is_installed(&self, id: &str) -> Result<bool> {
        let command = self.list_command(id);
        let output = query(self.runner, &command)?;
        match self.oracle.presence(&output) {
            Some(presence) => Ok(presence == Presence::Present),
            None => Err(Error::UndeterminedPresence {
                package: id.to_string(),
                command: command.to_string(),
            }),
        }
    }

    /// Make sure the package with exact id `id` is installed.
    pub fn ensure_installed(&self, id: &str) -> Result<Outcome> {
        if self.is_installed(id)? {
            debug!(package = id, "Already installed via winget");
            return Ok(Outcome::AlreadyPresent);
        }

        if self.mode.is_dry_run() {
            return Ok(Outcome::WouldInstall);
        }

        info!(package = id, "Installing with winget");
        execute(self.runner, &self.install_command(id))?;
        Ok(Outcome::Installed)
    }
}
