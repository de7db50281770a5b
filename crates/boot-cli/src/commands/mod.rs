//! Command implementations

pub mod apply;
pub mod setup;

pub use apply::run_manifest;
pub use setup::run_setup;
