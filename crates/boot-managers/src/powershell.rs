//! PowerShell invocation helpers

use crate::CommandSpec;

/// Quote a value as a single-quoted PowerShell string literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build a non-interactive PowerShell invocation of `script`.
pub fn script(program: &str, script: impl Into<String>) -> CommandSpec {
    CommandSpec::new(program).args(["-NoProfile", "-NonInteractive", "-Command"]).arg(script)
}
