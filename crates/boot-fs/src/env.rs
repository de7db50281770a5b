//! Captured process environment used for path expansion

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Variables consulted, in order, for the current user name.
const USER_VARS: [&str; 3] = ["USERNAME", "USER", "LOGNAME"];

/// An immutable view of the environment a run resolves paths against.
///
/// Captured once per invocation so path expansion is a pure function of
/// its input. Tests build snapshots directly instead of mutating the real
/// process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
    cwd: PathBuf,
}

impl EnvSnapshot {
    /// Create an empty snapshot rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            vars: BTreeMap::new(),
            cwd: cwd.into(),
        }
    }

    /// Capture the current process environment and working directory.
    ///
    /// Variables whose names or values are not valid Unicode are skipped.
    pub fn capture() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Ok(Self { vars, cwd })
    }

    /// Builder-style variable insertion.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Look up a variable.
    ///
    /// Names are case-insensitive on Windows, matching the host platform.
    pub fn var(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.vars.get(name) {
            return Some(value.as_str());
        }
        if cfg!(windows) {
            return self
                .vars
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str());
        }
        None
    }

    /// Working directory relative paths are resolved against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The current OS user name, if any of the usual variables is set.
    pub fn user_name(&self) -> Option<&str> {
        USER_VARS
            .iter()
            .filter_map(|name| self.var(name))
            .find(|value| !value.is_empty())
    }
}
