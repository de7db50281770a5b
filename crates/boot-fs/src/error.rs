//! Error types for boot-fs

use std::path::PathBuf;

/// Result type for boot-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in boot-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} file at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported file format: {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("Environment variable ${name} referenced in {raw:?} is not defined")]
    UndefinedVariable { name: String, raw: String },

    #[error("No user name available to substitute into {raw:?}")]
    UnknownUser { raw: String },

    #[error("Cannot link {path}: parent directory does not exist")]
    MissingParent { path: PathBuf },

    #[error("Failed to create symbolic link at {path}: {source}{hint}")]
    LinkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        hint: &'static str,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
