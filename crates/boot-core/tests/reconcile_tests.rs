//! Reconciler behaviour against a scripted machine.

use boot_core::{
    ManagerKind, ManagerSpec, Manifest, RecordSpec, RecordStatus, Reconciler, RunFilter, Settings,
    StepAction, Workspace,
};
use boot_fs::{ApplyMode, EnvSnapshot, FileOutcome, StructuredFormat};
use boot_managers::Outcome;
use boot_test_utils::{FakeMachine, Workdir};
use pretty_assertions::assert_eq;

fn env(dir: &Workdir) -> EnvSnapshot {
    EnvSnapshot::new(dir.root())
        .with_var("DOTFILES", dir.path("dotfiles").to_string_lossy())
        .with_var("TARGET", dir.path("home").to_string_lossy())
        .with_var("USERNAME", "alice")
}

fn manifest(json: &str) -> Manifest {
    Manifest::parse(json, StructuredFormat::Json).unwrap()
}

const HOME_MANIFEST: &str = r#"[
    {"package": "git", "manager": {"name": "scoop", "bucket": "main"}, "workspace": "home"},
    {"package": "OldApp", "manager": {"name": "appx"}, "workspace": "global"}
]"#;

#[test]
fn test_home_run_processes_home_and_global_records() {
    let dir = Workdir::new();
    let machine = FakeMachine::new().with_appx("OldApp", "OldApp_1.0_x64__abc");
    let settings = Settings::default();
    let env = env(&dir);

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest(HOME_MANIFEST), &RunFilter::for_workspace(Workspace::Home))
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped, 0);

    let git = report.record("git").unwrap();
    assert_eq!(git.status(), RecordStatus::Changed);
    assert_eq!(git.steps[0].action, StepAction::Bucket);
    assert_eq!(git.steps[0].outcome, Outcome::Added);
    assert_eq!(git.steps[1].outcome, Outcome::Installed);
    assert!(machine.has_bucket("main"));
    assert!(machine.has_scoop_app("git"));

    let old = report.record("OldApp").unwrap();
    assert_eq!(old.steps[0].outcome, Outcome::Removed);
    assert!(!machine.has_appx("OldApp"));
}

#[test]
fn test_work_run_skips_home_records() {
    let dir = Workdir::new();
    let machine = FakeMachine::new();
    let settings = Settings::default();
    let env = env(&dir);

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest(HOME_MANIFEST), &RunFilter::for_workspace(Workspace::Work))
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert!(report.record("git").is_none());
    assert!(!machine.has_scoop_app("git"));
    assert_eq!(report.record("OldApp").unwrap().status(), RecordStatus::Unchanged);
}

#[test]
fn test_second_run_changes_nothing() {
    let dir = Workdir::new();
    dir.write("dotfiles/.gitconfig", "[user]\n\tname = alice\n");
    let machine = FakeMachine::new().with_appx("OldApp", "OldApp_1.0_x64__abc");
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(
        r#"[
        {"package": "git", "manager": {"name": "scoop", "bucket": "main"}, "workspace": "home",
         "files": [{"source": "$DOTFILES/.gitconfig", "destination": "$TARGET/.gitconfig", "type": "copy"}]},
        {"package": "Git.Git", "manager": {"name": "winget"}},
        {"package": "OldApp", "manager": {"name": "appx"}}
    ]"#,
    );
    let reconciler = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply);
    let filter = RunFilter::for_workspace(Workspace::Home);

    let first = reconciler.run(&manifest, &filter).unwrap();
    assert_eq!(first.summary().changed, 3);

    machine.clear_log();
    let second = reconciler.run(&manifest, &filter).unwrap();
    assert!(machine.mutating_commands().is_empty(), "{:?}", machine.mutating_commands());
    assert_eq!(second.summary().unchanged, 3);
    assert_eq!(second.record("git").unwrap().files[0].outcome, FileOutcome::Unchanged);
}

#[test]
fn test_failing_record_does_not_stop_the_next() {
    let dir = Workdir::new();
    let machine = FakeMachine::new()
        .with_bucket("main")
        .fail_on("broken")
        .fail_on("Bad.Id");
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(
        r#"[
        {"package": "broken", "manager": {"name": "scoop", "bucket": "main"}},
        {"package": "Bad.Id", "manager": {"name": "winget"}},
        {"package": "ripgrep", "manager": {"name": "scoop", "bucket": "main"}}
    ]"#,
    );

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest, &RunFilter::default())
        .unwrap();

    assert_eq!(report.record("broken").unwrap().status(), RecordStatus::Failed);
    assert_eq!(report.record("Bad.Id").unwrap().status(), RecordStatus::Failed);
    assert_eq!(report.record("ripgrep").unwrap().status(), RecordStatus::Changed);
    assert!(machine.has_scoop_app("ripgrep"));
    assert_eq!(report.summary().failed, 2);
}

#[test]
fn test_bucket_failure_skips_install() {
    let dir = Workdir::new();
    let machine = FakeMachine::new().fail_on("private");
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(r#"[{"package": "tool", "manager": {"name": "scoop", "bucket": "private"}}]"#);

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest, &RunFilter::default())
        .unwrap();

    let record = report.record("tool").unwrap();
    assert!(record.steps.is_empty());
    assert!(record.error.as_deref().unwrap().contains("bucket add"));
    assert!(!machine.has_scoop_app("tool"));
}

#[test]
fn test_files_are_placed_even_when_install_fails() {
    let dir = Workdir::new();
    dir.write("dotfiles/init.vim", "set number\n");
    let machine = FakeMachine::new().with_bucket("main").fail_on("neovim");
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(
        r#"[{"package": "neovim", "manager": {"name": "scoop", "bucket": "main"},
            "files": [{"source": "$DOTFILES/init.vim", "destination": "$TARGET/{username}/nvim/init.vim", "type": "copy"}]}]"#,
    );

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest, &RunFilter::default())
        .unwrap();

    let record = report.record("neovim").unwrap();
    assert!(record.error.is_some());
    assert_eq!(record.files[0].outcome, FileOutcome::Copied);
    assert_eq!(dir.read("home/alice/nvim/init.vim"), "set number\n");
}

#[test]
fn test_unknown_manager_is_reported_and_files_still_placed() {
    let dir = Workdir::new();
    dir.write("dotfiles/profile.ps1", "Set-PSReadLineOption -EditMode Emacs\n");
    let machine = FakeMachine::new();
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(
        r#"[
        {"package": "pwsh-profile", "manager": {"name": "chocolatey"},
         "files": [{"source": "$DOTFILES/profile.ps1", "destination": "$TARGET/profile.ps1", "type": "copy"}]},
        {"package": "Git.Git", "manager": {"name": "winget"}}
    ]"#,
    );

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest, &RunFilter::default())
        .unwrap();

    let bad = report.record("pwsh-profile").unwrap();
    assert_eq!(bad.status(), RecordStatus::Misconfigured);
    assert!(bad.error.as_deref().unwrap().contains("chocolatey"));
    assert!(dir.exists("home/profile.ps1"));

    assert!(machine.has_winget_package("Git.Git"));
    let summary = report.summary();
    assert_eq!(summary.misconfigured, 1);
    assert_eq!(summary.changed, 1);
}

#[test]
fn test_scoop_without_bucket_is_misconfigured() {
    let dir = Workdir::new();
    let machine = FakeMachine::new();
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(r#"[{"package": "git", "manager": {"name": "scoop"}}]"#);

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest, &RunFilter::default())
        .unwrap();

    assert_eq!(report.record("git").unwrap().status(), RecordStatus::Misconfigured);
    assert!(machine.commands().is_empty());
}

#[test]
fn test_dry_run_reports_pending_work_only() {
    let dir = Workdir::new();
    dir.write("dotfiles/.gitconfig", "[core]\n");
    let machine = FakeMachine::new().with_appx("OldApp", "OldApp_1.0_x64__abc");
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(
        r#"[
        {"package": "git", "manager": {"name": "scoop", "bucket": "main"},
         "files": [{"source": "$DOTFILES/.gitconfig", "destination": "$TARGET/.gitconfig", "type": "copy"}]},
        {"package": "OldApp", "manager": {"name": "appx"}}
    ]"#,
    );

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::DryRun)
        .run(&manifest, &RunFilter::default())
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.summary().pending, 2);
    assert_eq!(report.record("git").unwrap().steps[0].outcome, Outcome::WouldAdd);
    assert_eq!(report.record("git").unwrap().files[0].outcome, FileOutcome::WouldCopy);
    assert!(machine.mutating_commands().is_empty());
    assert!(!dir.exists("home/.gitconfig"));
    assert!(machine.has_appx("OldApp"));
}

#[test]
fn test_manager_and_package_filters() {
    let dir = Workdir::new();
    let machine = FakeMachine::new();
    let settings = Settings::default();
    let env = env(&dir);
    let manifest = manifest(
        r#"[
        {"package": "git", "manager": {"name": "scoop", "bucket": "main"}},
        {"package": "Git.Git", "manager": {"name": "winget"}},
        {"package": "7zip.7zip", "manager": {"name": "winget"}}
    ]"#,
    );
    let filter = RunFilter::default()
        .with_manager(ManagerKind::Winget)
        .with_package("Git.Git");

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest, &filter)
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.skipped, 2);
    assert!(machine.has_winget_package("Git.Git"));
    assert!(!machine.has_winget_package("7zip.7zip"));
}

#[test]
fn test_undefined_variable_under_strict_policy_fails_the_file() {
    let dir = Workdir::new();
    let machine = FakeMachine::new();
    let mut settings = Settings::default();
    settings.paths.strict_env = true;
    let env = env(&dir);
    let manifest = manifest(
        r#"[{"package": "OldApp", "manager": {"name": "appx"},
            "files": [{"source": "$NOT_SET/a", "destination": "$TARGET/a", "type": "copy"}]}]"#,
    );

    let report = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest, &RunFilter::default())
        .unwrap();

    let record = report.record("OldApp").unwrap();
    assert!(record.files[0].outcome.is_failure());
    assert_eq!(record.status(), RecordStatus::Failed);
}

#[test]
fn test_invalid_winget_pattern_aborts_the_run() {
    let dir = Workdir::new();
    let machine = FakeMachine::new();
    let mut settings = Settings::default();
    settings.winget.not_found_pattern = "(unclosed".into();
    let env = env(&dir);

    let result = Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&manifest(HOME_MANIFEST), &RunFilter::default());

    assert!(result.is_err());
    assert!(machine.commands().is_empty());
}

#[test]
fn test_records_are_processed_in_manifest_order() {
    let dir = Workdir::new();
    let machine = FakeMachine::new().with_bucket("main");
    let settings = Settings::default();
    let env = env(&dir);
    let records = ["zoxide", "bat", "fd"]
        .into_iter()
        .map(|package| RecordSpec {
            package: package.into(),
            manager: ManagerSpec {
                name: "scoop".into(),
                bucket: Some("main".into()),
            },
            workspace: None,
            files: None,
        })
        .collect();

    Reconciler::new(&machine, &settings, &env, ApplyMode::Apply)
        .run(&Manifest::from_records(records), &RunFilter::default())
        .unwrap();

    let installs: Vec<String> = machine
        .mutating_commands()
        .into_iter()
        .filter(|c| c.contains(" install "))
        .collect();
    let expected: Vec<String> = ["zoxide", "bat", "fd"]
        .iter()
        .map(|package| format!("{} install {}", settings.tools.scoop, package))
        .collect();
    assert_eq!(installs, expected);
}
