//! CLI argument parsing using clap derive

use std::path::PathBuf;

use boot_core::{ManagerKind, RunFilter, Workspace};
use clap::Parser;

/// machine-bootstrap - Bring a Windows machine to the state described by a package manifest
#[derive(Parser, Debug)]
#[command(name = "boot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Package manifest (.json, .yaml, .yml or .toml)
    #[arg(short, long, env = "BOOTSTRAP_MANIFEST", required_unless_present = "setup")]
    pub manifest: Option<PathBuf>,

    /// Workspace to provision (work, home, global); global records always run
    #[arg(short, long, default_value = "home")]
    pub workspace: Workspace,

    /// Only process the record whose package equals this exactly
    #[arg(short, long)]
    pub package: Option<String>,

    /// Only process records for this manager (scoop, winget, appx)
    #[arg(short = 'M', long)]
    pub manager: Option<ManagerKind>,

    /// Run one-time machine setup (needs an elevated shell), then exit
    #[arg(long)]
    pub setup: bool,

    /// Query state only, change nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file
    #[arg(short, long, env = "BOOTSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Record selection described by the flags.
    pub fn filter(&self) -> RunFilter {
        RunFilter {
            workspace: Some(self.workspace),
            package: self.package.clone(),
            manager: self.manager,
        }
    }
}
