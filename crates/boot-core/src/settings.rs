//! Tool settings
//!
//! Settings are optional. They are looked up in this order:
//! 1. An explicit path (`--config` / `$BOOTSTRAP_CONFIG`), which must exist
//! 2. `<config dir>/machine-bootstrap/config.toml`, used only if present
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use boot_fs::ResolvePolicy;
use boot_managers::oracle::WINGET_NOT_FOUND;
use boot_managers::{NotFoundPattern, ToolPaths};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

const APP_DIR: &str = "machine-bootstrap";
const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Fail on undefined `$VARIABLES` instead of substituting ""
    pub strict_env: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WingetSettings {
    /// Case-insensitive regex that marks `winget list` output as "not installed"
    pub not_found_pattern: String,
}

impl Default for WingetSettings {
    fn default() -> Self {
        Self {
            not_found_pattern: WINGET_NOT_FOUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupSettings {
    /// winget id of the shell runtime installed during setup
    pub shell_package: String,
    /// Scheduled task that keeps the aria2 RPC daemon running
    pub task_name: String,
    pub aria2_command: String,
    pub aria2_args: String,
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            shell_package: "Microsoft.PowerShell".to_string(),
            task_name: "aria2-rpc".to_string(),
            aria2_command: "aria2c".to_string(),
            aria2_args: "--enable-rpc --rpc-listen-all=false".to_string(),
        }
    }
}

/// All user-tunable settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolPaths,
    pub paths: PathSettings,
    pub winget: WingetSettings,
    pub setup: SetupSettings,
}

impl Settings {
    /// Resolve settings using the lookup order in the module docs.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Error::SettingsNotFound {
                    path: path.to_path_buf(),
                });
            }
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a settings file (TOML, JSON or YAML by extension).
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading settings");
        Ok(boot_fs::load_structured(path)?)
    }

    /// Platform default location of the settings file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(FILE_NAME))
    }

    pub fn resolve_policy(&self) -> ResolvePolicy {
        if self.paths.strict_env {
            ResolvePolicy::Strict
        } else {
            ResolvePolicy::Permissive
        }
    }

    /// Oracle for reading `winget list` output.
    pub fn winget_oracle(&self) -> Result<NotFoundPattern> {
        Ok(NotFoundPattern::new(&self.winget.not_found_pattern)?)
    }
}
