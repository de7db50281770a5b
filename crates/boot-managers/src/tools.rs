use serde::{Deserialize, Serialize};

/// Executable names (or paths) of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub scoop: String,
    pub winget: String,
    pub powershell: String,
    pub schtasks: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            scoop: if cfg!(windows) { "scoop.cmd" } else { "scoop" }.to_string(),
            winget: "winget".to_string(),
            powershell: if cfg!(windows) { "powershell" } else { "pwsh" }.to_string(),
            schtasks: "schtasks".to_string(),
        }
    }
}
