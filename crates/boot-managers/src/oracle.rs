//! Interpretation of "is it installed" query output
//!
//! Some backends only signal absence through human-readable text. That
//! parsing lives behind [`PresenceOracle`] so it can be replaced (for
//! example by an exit-code check) without touching the adapters' callers.

use std::sync::LazyLock;

use regex::Regex;

use crate::{CommandOutput, Error, Result};

/// Installation state derived from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

/// Decides presence from the output of a list/query command.
pub trait PresenceOracle {
    /// `None` when the output does not allow a decision.
    fn presence(&self, output: &CommandOutput) -> Option<Presence>;
}

/// Default text shown by winget when nothing matches a `list` query.
pub const WINGET_NOT_FOUND: &str = "No installed package found";

static DEFAULT_NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)No installed package found").expect("Invalid default not-found regex")
});

/// Treats output matching a pattern as absence, otherwise trusts the exit code.
#[derive(Debug, Clone)]
pub struct NotFoundPattern {
    pattern: Regex,
}

impl NotFoundPattern {
    /// Build from a case-insensitive regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(&format!("(?i){}", pattern)).map_err(|source| {
            Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self { pattern })
    }
}

impl Default for NotFoundPattern {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_NOT_FOUND.clone(),
        }
    }
}

impl PresenceOracle for NotFoundPattern {
    fn presence(&self, output: &CommandOutput) -> Option<Presence> {
        if self.pattern.is_match(&output.stdout) || self.pattern.is_match(&output.stderr) {
            return Some(Presence::Absent);
        }
        output.success().then_some(Presence::Present)
    }
}

/// Presence by exit code alone: zero is present, any other code absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitCodeOracle;

impl PresenceOracle for ExitCodeOracle {
    fn presence(&self, output: &CommandOutput) -> Option<Presence> {
        match output.code {
            Some(0) => Some(Presence::Present),
            Some(_) => Some(Presence::Absent),
            None => None,
        }
    }
}
