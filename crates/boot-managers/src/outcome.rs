use serde::Serialize;

/// Result of one ensure operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AlreadyPresent,
    AlreadyAbsent,
    Installed,
    Added,
    Removed,
    Configured,
    WouldInstall,
    WouldAdd,
    WouldRemove,
    WouldConfigure,
}

impl Outcome {
    /// The machine was changed.
    pub fn is_change(self) -> bool {
        matches!(self, Self::Installed | Self::Added | Self::Removed | Self::Configured)
    }

    /// A dry run found a pending change.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            Self::WouldInstall | Self::WouldAdd | Self::WouldRemove | Self::WouldConfigure
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AlreadyPresent => "already present",
            Self::AlreadyAbsent => "already absent",
            Self::Installed => "installed",
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Configured => "configured",
            Self::WouldInstall => "would install",
            Self::WouldAdd => "would add",
            Self::WouldRemove => "would remove",
            Self::WouldConfigure => "would configure",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
