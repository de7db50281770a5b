//! Shared test utilities for the machine-bootstrap workspace.
//!
//! Used as a dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`machine`]: [`FakeMachine`], a scripted stand-in for the external
//!   package managers and OS tools
//! - [`workdir`]: [`Workdir`], a temp directory for manifests and dotfiles

pub mod machine;
pub mod workdir;

pub use machine::FakeMachine;
pub use workdir::Workdir;
