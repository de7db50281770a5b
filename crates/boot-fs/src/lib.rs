//! Filesystem layer for machine-bootstrap
//!
//! Expands manifest paths against an explicit environment snapshot and
//! places configuration files (copy or symlink) into their destinations.

pub mod checksum;
pub mod config;
pub mod env;
pub mod error;
pub mod io;
pub mod materialize;
pub mod mode;
pub mod path;

pub use config::{StructuredFormat, load_structured};
pub use env::EnvSnapshot;
pub use error::{Error, Result};
pub use materialize::{FileOpKind, FileOperation, FileOutcome, FileReport, Materializer};
pub use mode::ApplyMode;
pub use path::{PathResolver, ResolvePolicy, USERNAME_PLACEHOLDER};
