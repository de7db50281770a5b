//! machine-bootstrap CLI
//!
//! Reconciles a package manifest against the machine, or runs the one-time
//! setup with `--setup`.

mod cli;
mod commands;
mod error;
mod logging;

use boot_core::Settings;
use boot_fs::{ApplyMode, EnvSnapshot};
use boot_managers::SystemRunner;
use clap::Parser;
use colored::Colorize;

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to initialise logging: {}", e)))?;
    tracing::debug!(?cli, "Parsed arguments");

    let settings = Settings::load(cli.config.as_deref())?;
    let mode = ApplyMode::from_dry_run(cli.dry_run);
    let runner = SystemRunner;

    if cli.setup {
        return commands::run_setup(&runner, &settings, mode, cli.json);
    }

    let manifest = cli
        .manifest
        .as_deref()
        .ok_or_else(|| CliError::user("--manifest is required unless --setup is given"))?;
    let env = EnvSnapshot::capture()?;
    commands::run_manifest(&runner, &settings, &env, manifest, &cli.filter(), mode, cli.json)
}
