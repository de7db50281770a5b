//! Format-agnostic structured file loading
//!
//! Manifests and settings may be written as TOML, JSON or YAML; the format
//! is picked from the file extension.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result, io};

/// Supported structured file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Toml,
    Json,
    Yaml,
}

impl StructuredFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    /// Parse `content` as this format.
    pub fn parse<T: DeserializeOwned>(self, content: &str, path: &Path) -> Result<T> {
        let parsed = match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::ConfigParse {
            path: path.to_path_buf(),
            format: self.name().into(),
            message,
        })
    }
}

/// Load and parse a structured file, detecting its format by extension.
pub fn load_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = StructuredFormat::from_path(path)?;
    let content = io::read_text(path)?;
    format.parse(&content, path)
}
