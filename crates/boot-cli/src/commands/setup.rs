//! One-time machine setup

use boot_core::{MachineSetup, Settings};
use boot_fs::ApplyMode;
use boot_managers::CommandRunner;
use colored::Colorize;

use crate::error::Result;

/// Run setup and print each step. Only missing elevation is an error.
pub fn run_setup(
    runner: &dyn CommandRunner,
    settings: &Settings,
    mode: ApplyMode,
    json: bool,
) -> Result<()> {
    if !json {
        println!("{} Setting up machine...", "=>".blue().bold());
    }

    let report = MachineSetup::new(runner, settings, mode).run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.steps {
        match (&step.outcome, &step.error) {
            (_, Some(error)) => println!("{} {}: {}", "FAILED".red().bold(), step.name, error),
            (Some(outcome), None) => println!("{} {}: {}", "OK".green().bold(), step.name, outcome),
            (None, None) => {}
        }
    }

    if report.failures() > 0 {
        println!();
        println!(
            "{} {} step(s) failed; fix the errors above and re-run {}",
            "!".yellow().bold(),
            report.failures(),
            "boot --setup".cyan()
        );
    }
    Ok(())
}
