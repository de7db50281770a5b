/// Whether an operation may change the machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApplyMode {
    /// Query state and make changes
    #[default]
    Apply,
    /// Query state only, report what would change
    DryRun,
}

impl ApplyMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Apply }
    }

    pub fn is_dry_run(self) -> bool {
        self == Self::DryRun
    }
}
