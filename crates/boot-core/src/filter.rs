//! Record selection for a run

use crate::{ManagerKind, RecordSpec, Workspace};

/// Scope of a run. Every set criterion must match (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    /// Only records for this workspace or `global`
    pub workspace: Option<Workspace>,
    /// Only the record whose package equals this exactly
    pub package: Option<String>,
    /// Only records for this manager
    pub manager: Option<ManagerKind>,
}

impl RunFilter {
    pub fn for_workspace(workspace: Workspace) -> Self {
        Self {
            workspace: Some(workspace),
            ..Default::default()
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_manager(mut self, manager: ManagerKind) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Whether `record` is in scope.
    ///
    /// Works on the record as written, so a record with an unrecognised
    /// workspace or manager simply fails to match a filter on that field.
    pub fn matches(&self, record: &RecordSpec) -> bool {
        if let Some(package) = &self.package {
            if record.package != *package {
                return false;
            }
        }

        if let Some(requested) = self.workspace {
            match record.workspace_name().parse::<Workspace>() {
                Ok(workspace) if workspace.applies_to(requested) => {}
                _ => return false,
            }
        }

        if let Some(manager) = self.manager {
            if !record.manager.name.trim().eq_ignore_ascii_case(manager.as_str()) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManagerSpec;

    fn record(package: &str, manager: &str, workspace: Option<&str>) -> RecordSpec {
        RecordSpec {
            package: package.into(),
            manager: ManagerSpec {
                name: manager.into(),
                bucket: Some("main".into()),
            },
            workspace: workspace.map(Into::into),
            files: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = RunFilter::default();
        assert!(filter.matches(&record("git", "scoop", Some("work"))));
        assert!(filter.matches(&record("x", "unknown", Some("nowhere"))));
    }

    #[test]
    fn workspace_filter_is_case_insensitive_and_admits_global() {
        let filter = RunFilter::for_workspace(Workspace::Home);
        assert!(filter.matches(&record("a", "scoop", Some("HOME"))));
        assert!(filter.matches(&record("b", "scoop", Some("Global"))));
        assert!(filter.matches(&record("c", "scoop", None)));
        assert!(!filter.matches(&record("d", "scoop", Some("work"))));
    }

    #[test]
    fn workspace_filter_agrees_with_validation_on_padding() {
        let filter = RunFilter::for_workspace(Workspace::Home);
        let padded = record("a", "scoop", Some(" home "));
        assert!(filter.matches(&padded));
        assert_eq!(padded.validate().unwrap().workspace, Workspace::Home);
        assert!(filter.matches(&record("b", "scoop", Some("\tglobal"))));
        assert!(!filter.matches(&record("c", "scoop", Some("office"))));
    }

    #[test]
    fn package_filter_is_exact() {
        let filter = RunFilter::default().with_package("git");
        assert!(filter.matches(&record("git", "scoop", None)));
        assert!(!filter.matches(&record("Git", "scoop", None)));
        assert!(!filter.matches(&record("git-lfs", "scoop", None)));
    }

    #[test]
    fn manager_filter() {
        let filter = RunFilter::default().with_manager(ManagerKind::Winget);
        assert!(filter.matches(&record("Git.Git", "WinGet", None)));
        assert!(!filter.matches(&record("git", "scoop", None)));
        assert!(!filter.matches(&record("x", "unknown", None)));
    }

    #[test]
    fn criteria_combine_with_and() {
        let filter = RunFilter::for_workspace(Workspace::Work)
            .with_package("git")
            .with_manager(ManagerKind::Scoop);
        assert!(filter.matches(&record("git", "scoop", Some("work"))));
        assert!(!filter.matches(&record("git", "scoop", Some("home"))));
        assert!(!filter.matches(&record("git", "winget", Some("work"))));
        assert!(!filter.matches(&record("vim", "scoop", Some("work"))));
    }
}
