//! Package manager adapters for machine-bootstrap
//!
//! Each adapter maps the generic "ensure present / ensure absent" contract
//! onto one external tool. All tools are invoked through [`CommandRunner`],
//! so tests can substitute a scripted machine for the real one.

pub mod appx;
pub mod elevation;
pub mod error;
pub mod oracle;
pub mod outcome;
pub mod powershell;
pub mod runner;
pub mod schtasks;
pub mod scoop;
pub mod tools;
pub mod winget;

pub use appx::AppxAdapter;
pub use elevation::is_elevated;
pub use error::{Error, Result};
pub use oracle::{ExitCodeOracle, NotFoundPattern, Presence, PresenceOracle};
pub use outcome::Outcome;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use schtasks::TaskScheduler;
pub use scoop::ScoopAdapter;
pub use tools::ToolPaths;
pub use winget::WingetAdapter;

pub use boot_fs::ApplyMode;
