//! Reconciliation engine for machine-bootstrap
//!
//! Loads a package manifest, narrows it with [`RunFilter`], and drives each
//! surviving record through the matching package manager adapter and the
//! config file materializer. Failures stay local to the record (or file)
//! that caused them.

pub mod error;
pub mod filter;
pub mod manifest;
pub mod reconcile;
pub mod report;
pub mod settings;
pub mod setup;

pub use error::{Error, RecordError, Result};
pub use filter::RunFilter;
pub use manifest::{Manager, ManagerKind, ManagerSpec, Manifest, PackageRecord, RecordSpec, Workspace};
pub use reconcile::Reconciler;
pub use report::{RecordReport, RecordStatus, RunReport, StepAction, StepReport, Summary};
pub use settings::Settings;
pub use setup::{MachineSetup, SetupReport, SetupStep};
