use tracing::debug;

use crate::{CommandRunner, CommandSpec};

/// Whether the current process runs with administrative rights.
///
/// On Windows `net session` only succeeds in an elevated shell; elsewhere
/// the effective user id must be 0. Any failure to check counts as not
/// elevated.
pub fn is_elevated(runner: &dyn CommandRunner) -> bool {
    let elevated = if cfg!(windows) {
        runner
            .run(&CommandSpec::new("net").arg("session"))
            .map(|output| output.success())
            .unwrap_or(false)
    } else {
        runner
            .run(&CommandSpec::new("id").arg("-u"))
            .map(|output| output.success() && output.stdout.trim() == "0")
            .unwrap_or(false)
    };
    debug!(elevated, "Checked privilege elevation");
    elevated
}
