//! Subprocess execution seam
//!
//! Adapters never spawn processes directly; they describe a
//! [`CommandSpec`] and hand it to a [`CommandRunner`].

use std::fmt;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::{Error, Result};

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best available failure text: stderr if present, else stdout.
    ///
    /// Several Windows tools report errors on stdout only.
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        self.stdout.trim().to_string()
    }
}

/// Runs external commands to completion.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> std::io::Result<CommandOutput>;
}

/// Runs commands on the real machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> std::io::Result<CommandOutput> {
        debug!(command = %command, "Running");
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command, mapping spawn failures to [`Error::ToolUnavailable`].
///
/// A non-zero exit is not an error here; callers that query state
/// interpret the exit code themselves.
pub fn query(runner: &dyn CommandRunner, command: &CommandSpec) -> Result<CommandOutput> {
    runner.run(command).map_err(|source| Error::ToolUnavailable {
        program: command.program.clone(),
        source,
    })
}

/// Run a command that must succeed.
pub fn execute(runner: &dyn CommandRunner, command: &CommandSpec) -> Result<CommandOutput> {
    let output = query(runner, command)?;
    if output.success() {
        Ok(output)
    } else {
        Err(Error::CommandFailed {
            command: command.to_string(),
            code: output.code.unwrap_or(-1),
            detail: output.failure_detail(),
        })
    }
}
