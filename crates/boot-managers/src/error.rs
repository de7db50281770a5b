//! Error types for boot-managers

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving an external package manager
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not run {program}: {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit code {code}: {detail}")]
    CommandFailed {
        command: String,
        code: i32,
        detail: String,
    },

    #[error("Could not determine whether {package} is installed from `{command}` output")]
    UndeterminedPresence { package: String, command: String },

    #[error("Invalid presence pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
