//! Error types for boot-core

use std::path::PathBuf;

/// Result type for boot-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest file does not exist
    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// Manifest exists but could not be read or parsed
    #[error("Invalid manifest: {0}")]
    InvalidManifest(#[source] boot_fs::Error),

    /// Explicitly requested settings file does not exist
    #[error("Settings file not found at {path}")]
    SettingsNotFound { path: PathBuf },

    /// Setup mode needs administrative rights
    #[error("Machine setup requires an elevated (administrator) shell; re-run it as administrator")]
    NotElevated,

    /// Filesystem error from boot-fs
    #[error(transparent)]
    Fs(#[from] boot_fs::Error),

    /// Adapter error from boot-managers
    #[error(transparent)]
    Managers(#[from] boot_managers::Error),
}

/// Problems with a single manifest record.
///
/// These are reported per record and never stop the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("package name is empty")]
    EmptyPackage,

    #[error("unknown package manager {name:?} (expected one of: scoop, winget, appx)")]
    UnknownManager { name: String },

    #[error("unknown workspace {name:?} (expected one of: work, home, global)")]
    UnknownWorkspace { name: String },

    #[error("scoop package {package:?} has no manager.bucket")]
    MissingBucket { package: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_manager_lists_supported_names() {
        let err = RecordError::UnknownManager { name: "chocolatey".into() };
        let msg = err.to_string();
        assert!(msg.contains("chocolatey"));
        assert!(msg.contains("scoop, winget, appx"));
    }

    #[test]
    fn not_elevated_message_is_actionable() {
        assert!(Error::NotElevated.to_string().contains("administrator"));
    }
}
