//! Error types for boot-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end the process with exit status 1
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from boot-core
    #[error(transparent)]
    Core(#[from] boot_core::Error),

    /// Error from boot-fs
    #[error(transparent)]
    Fs(#[from] boot_fs::Error),

    /// Report could not be rendered as JSON
    #[error("Failed to render JSON report: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
