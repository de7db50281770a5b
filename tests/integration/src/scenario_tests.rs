//! Scenario tests: manifest files on disk, a scripted machine, real dotfiles.
//!
//! Each module walks one provisioning story from `Manifest::load` through
//! the reconciler and checks both the machine state and the report.

use boot_core::{Manifest, RecordStatus, Reconciler, RunFilter, RunReport, Settings, Workspace};
use boot_fs::{ApplyMode, EnvSnapshot, FileOutcome};
use boot_test_utils::{FakeMachine, Workdir};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// A user profile directory plus a dotfiles checkout.
struct Profile {
    dir: Workdir,
}

impl Profile {
    fn new() -> Self {
        let dir = Workdir::new();
        dir.mkdir("home");
        dir.write("dotfiles/git/.gitconfig", "[user]\n\tname = alice\n");
        dir.write("dotfiles/nvim/init.lua", "vim.o.number = true\n");
        dir.write("dotfiles/nvim/lua/plugins.lua", "return {}\n");
        dir.write("dotfiles/wt/settings.json", "{\"theme\": \"dark\"}\n");
        Self { dir }
    }

    fn env(&self) -> EnvSnapshot {
        EnvSnapshot::new(self.dir.root())
            .with_var("DOTFILES", self.dir.path("dotfiles").to_string_lossy())
            .with_var("USERPROFILE", self.dir.path("home").to_string_lossy())
            .with_var("USERNAME", "alice")
    }

    fn manifest(&self, name: &str, content: &str) -> Manifest {
        let path = self.dir.write(name, content);
        Manifest::load(&path).unwrap()
    }

    fn run(&self, machine: &FakeMachine, manifest: &Manifest, filter: &RunFilter) -> RunReport {
        let settings = Settings::default();
        let env = self.env();
        Reconciler::new(machine, &settings, &env, ApplyMode::Apply)
            .run(manifest, filter)
            .unwrap()
    }
}

const WORKSTATION: &str = r#"{
  "packages": [
    {
      "package": "git",
      "manager": {"name": "scoop", "bucket": "main"},
      "workspace": "home",
      "files": [
        {"source": "$DOTFILES/git/.gitconfig", "destination": "$USERPROFILE/.gitconfig", "type": "copy"}
      ]
    },
    {
      "package": "neovim",
      "manager": {"name": "scoop", "bucket": "extras"},
      "workspace": "global",
      "files": [
        {"source": "$DOTFILES/nvim", "destination": "$USERPROFILE/AppData/Local/nvim", "type": "copy"}
      ]
    },
    {"package": "Microsoft.Teams", "manager": {"name": "winget"}, "workspace": "work"},
    {"package": "Microsoft.BingNews", "manager": {"name": "appx"}}
  ]
}"#;

// =============================================================================
// Fresh machine
// =============================================================================

mod fresh_machine {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn home_profile_is_provisioned() {
        let profile = Profile::new();
        let machine = FakeMachine::new().with_appx(
            "Microsoft.BingNews",
            "Microsoft.BingNews_4.55.62231.0_x64__8wekyb3d8bbwe",
        );
        let manifest = profile.manifest("packages.json", WORKSTATION);

        let report = profile.run(&machine, &manifest, &RunFilter::for_workspace(Workspace::Home));

        assert_eq!(report.skipped, 1);
        assert_eq!(report.summary().changed, 3);
        assert!(machine.has_bucket("main"));
        assert!(machine.has_bucket("extras"));
        assert!(machine.has_scoop_app("git"));
        assert!(machine.has_scoop_app("neovim"));
        assert!(!machine.has_winget_package("Microsoft.Teams"));
        assert!(!machine.has_appx("Microsoft.BingNews"));

        assert_eq!(profile.dir.read("home/.gitconfig"), "[user]\n\tname = alice\n");
        assert_eq!(
            profile.dir.read("home/AppData/Local/nvim/lua/plugins.lua"),
            "return {}\n"
        );
    }

    #[test]
    fn work_profile_gets_work_and_global_records() {
        let profile = Profile::new();
        let machine = FakeMachine::new();
        let manifest = profile.manifest("packages.json", WORKSTATION);

        let report = profile.run(&machine, &manifest, &RunFilter::for_workspace(Workspace::Work));

        let processed: Vec<&str> = report.records.iter().map(|r| r.package.as_str()).collect();
        assert_eq!(processed, vec!["neovim", "Microsoft.Teams", "Microsoft.BingNews"]);
        assert!(machine.has_winget_package("Microsoft.Teams"));
        assert!(!profile.dir.exists("home/.gitconfig"));
    }
}

// =============================================================================
// Re-runs
// =============================================================================

mod reruns {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn second_run_is_a_no_op() {
        let profile = Profile::new();
        let machine = FakeMachine::new();
        let manifest = profile.manifest("packages.json", WORKSTATION);
        let filter = RunFilter::for_workspace(Workspace::Home);

        profile.run(&machine, &manifest, &filter);
        machine.clear_log();
        let report = profile.run(&machine, &manifest, &filter);

        assert!(machine.mutating_commands().is_empty());
        assert!(
            report
                .records
                .iter()
                .all(|r| r.status() == RecordStatus::Unchanged)
        );
    }

    #[test]
    fn edited_dotfile_is_copied_again() {
        let profile = Profile::new();
        let machine = FakeMachine::new();
        let manifest = profile.manifest("packages.json", WORKSTATION);
        let filter = RunFilter::for_workspace(Workspace::Home).with_package("git");

        profile.run(&machine, &manifest, &filter);
        profile
            .dir
            .write("dotfiles/git/.gitconfig", "[user]\n\tname = alice\n[core]\n\tautocrlf = false\n");
        let report = profile.run(&machine, &manifest, &filter);

        let git = report.record("git").unwrap();
        assert_eq!(git.files[0].outcome, FileOutcome::Copied);
        assert!(profile.dir.read("home/.gitconfig").contains("autocrlf"));
    }
}

// =============================================================================
// Partial failure
// =============================================================================

mod partial_failure {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn broken_records_do_not_block_the_rest() {
        let profile = Profile::new();
        let machine = FakeMachine::new().fail_on("extras");
        let manifest = profile.manifest(
            "packages.yaml",
            r#"
- package: neovim
  manager: {name: scoop, bucket: extras}
  files:
    - {source: "$DOTFILES/nvim/init.lua", destination: "$USERPROFILE/init.lua", type: copy}
- package: terminal-settings
  manager: {name: choco}
  files:
    - {source: "$DOTFILES/wt/settings.json", destination: "$USERPROFILE/wt/settings.json", type: copy}
- package: git
  manager: {name: scoop, bucket: main}
"#,
        );

        let report = profile.run(&machine, &manifest, &RunFilter::default());

        assert_eq!(report.record("neovim").unwrap().status(), RecordStatus::Failed);
        assert_eq!(
            report.record("terminal-settings").unwrap().status(),
            RecordStatus::Misconfigured
        );
        assert_eq!(report.record("git").unwrap().status(), RecordStatus::Changed);

        assert!(profile.dir.exists("home/init.lua"));
        assert!(profile.dir.exists("home/wt/settings.json"));
        assert!(machine.has_scoop_app("git"));
        assert!(!machine.has_scoop_app("neovim"));
    }

    #[test]
    fn missing_dotfile_fails_only_its_operation() {
        let profile = Profile::new();
        let machine = FakeMachine::new();
        let manifest = profile.manifest(
            "packages.toml",
            r#"
[[packages]]
package = "Microsoft.BingNews"
manager = { name = "appx" }
files = [
  { source = "$DOTFILES/missing.txt", destination = "$USERPROFILE/missing.txt", type = "copy" },
  { source = "$DOTFILES/git/.gitconfig", destination = "$USERPROFILE/.gitconfig", type = "copy" },
]
"#,
        );

        let report = profile.run(&machine, &manifest, &RunFilter::default());

        let record = report.record("Microsoft.BingNews").unwrap();
        assert!(record.files[0].outcome.is_failure());
        assert_eq!(record.files[1].outcome, FileOutcome::Copied);
        assert_eq!(record.status(), RecordStatus::Failed);
    }
}

// =============================================================================
// Report
// =============================================================================

mod report {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_serializes_for_scripting() {
        let profile = Profile::new();
        let machine = FakeMachine::new();
        let manifest = profile.manifest("packages.json", WORKSTATION);

        let report = profile.run(&machine, &manifest, &RunFilter::for_workspace(Workspace::Home));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["records"][0]["package"], "git");
        assert_eq!(json["records"][0]["steps"][0]["action"], "bucket");
        assert_eq!(json["records"][0]["steps"][1]["outcome"], "installed");
        assert_eq!(json["records"][0]["files"][0]["outcome"]["status"], "copied");
        assert_eq!(json["skipped"], 1);
    }
}

// =============================================================================
// Links
// =============================================================================

#[cfg(unix)]
mod links {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn linked_config_points_at_dotfiles() {
        let profile = Profile::new();
        let machine = FakeMachine::new();
        let manifest = profile.manifest(
            "packages.json",
            r#"[{"package": "Microsoft.WindowsTerminal", "manager": {"name": "winget"},
                "files": [{"source": "$DOTFILES/wt/settings.json",
                           "destination": "$USERPROFILE/settings.json", "type": "link"}]}]"#,
        );

        let report = profile.run(&machine, &manifest, &RunFilter::default());

        let record = report.record("Microsoft.WindowsTerminal").unwrap();
        assert_eq!(record.files[0].outcome, FileOutcome::Linked);
        let target = std::fs::read_link(profile.dir.path("home/settings.json")).unwrap();
        assert_eq!(target, profile.dir.path("dotfiles/wt/settings.json"));

        let again = profile.run(&machine, &manifest, &RunFilter::default());
        assert_eq!(
            again.record("Microsoft.WindowsTerminal").unwrap().files[0].outcome,
            FileOutcome::Unchanged
        );
    }

    #[test]
    fn link_into_missing_directory_fails() {
        let profile = Profile::new();
        let machine = FakeMachine::new();
        let manifest = profile.manifest(
            "packages.json",
            r#"[{"package": "Microsoft.WindowsTerminal", "manager": {"name": "winget"},
                "files": [{"source": "$DOTFILES/wt/settings.json",
                           "destination": "$USERPROFILE/LocalState/settings.json", "type": "link"}]}]"#,
        );

        let report = profile.run(&machine, &manifest, &RunFilter::default());

        match &report.record("Microsoft.WindowsTerminal").unwrap().files[0].outcome {
            FileOutcome::Failed { message } => assert!(message.contains("parent directory")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!profile.dir.exists("home/LocalState"));
    }
}
