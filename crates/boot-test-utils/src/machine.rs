//! [`FakeMachine`]: an in-memory machine that answers the commands the
//! adapters issue.
//!
//! It understands the subset of `scoop`, `winget`, PowerShell Appx cmdlets,
//! `schtasks`, `net session` and `id -u` used by machine-bootstrap, records
//! every invocation, and can be told to fail specific packages or to lack
//! specific tools.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

use boot_managers::{CommandOutput, CommandRunner, CommandSpec};

/// Exit code winget returns when `list` finds nothing.
const WINGET_NO_MATCH: i32 = -1978335212;

#[derive(Debug, Default)]
struct State {
    scoop_available: bool,
    buckets: BTreeSet<String>,
    scoop_apps: BTreeSet<String>,
    scoop_config: BTreeMap<String, String>,
    winget_ids: BTreeSet<String>,
    /// Appx package name -> installed full names
    appx: BTreeMap<String, Vec<String>>,
    tasks: BTreeSet<String>,
    elevated: bool,
    failing: BTreeSet<String>,
    missing_tools: BTreeSet<String>,
}

/// Scripted [`CommandRunner`] with observable state.
///
/// # Example
///
/// ```rust
/// use boot_test_utils::FakeMachine;
///
/// let machine = FakeMachine::new().with_bucket("main").with_scoop_app("git");
/// assert!(machine.has_scoop_app("git"));
/// ```
#[derive(Debug)]
pub struct FakeMachine {
    state: RefCell<State>,
    log: RefCell<Vec<CommandSpec>>,
}

impl Default for FakeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeMachine {
    /// A machine with scoop available and nothing installed.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                scoop_available: true,
                ..Default::default()
            }),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn without_scoop(self) -> Self {
        self.state.borrow_mut().scoop_available = false;
        self
    }

    pub fn with_bucket(self, name: &str) -> Self {
        self.state.borrow_mut().buckets.insert(name.to_string());
        self
    }

    pub fn with_scoop_app(self, name: &str) -> Self {
        self.state.borrow_mut().scoop_apps.insert(name.to_string());
        self
    }

    pub fn with_winget_package(self, id: &str) -> Self {
        self.state.borrow_mut().winget_ids.insert(id.to_string());
        self
    }

    pub fn with_appx(self, name: &str, full_name: &str) -> Self {
        self.state
            .borrow_mut()
            .appx
            .entry(name.to_string())
            .or_default()
            .push(full_name.to_string());
        self
    }

    pub fn with_task(self, name: &str) -> Self {
        self.state.borrow_mut().tasks.insert(name.to_string());
        self
    }

    pub fn elevated(self) -> Self {
        self.state.borrow_mut().elevated = true;
        self
    }

    /// Make every mutating command that names `target` fail.
    pub fn fail_on(self, target: &str) -> Self {
        self.state.borrow_mut().failing.insert(target.to_string());
        self
    }

    /// Make spawning `program` fail as if it were not on PATH.
    pub fn without_tool(self, program: &str) -> Self {
        self.state.borrow_mut().missing_tools.insert(program.to_string());
        self
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        self.state.borrow().buckets.contains(name)
    }

    pub fn has_scoop_app(&self, name: &str) -> bool {
        self.state.borrow().scoop_apps.contains(name)
    }

    pub fn has_winget_package(&self, id: &str) -> bool {
        self.state.borrow().winget_ids.contains(id)
    }

    pub fn has_appx(&self, name: &str) -> bool {
        self.state.borrow().appx.contains_key(name)
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.state.borrow().tasks.contains(name)
    }

    pub fn scoop_available(&self) -> bool {
        self.state.borrow().scoop_available
    }

    pub fn scoop_config(&self, key: &str) -> Option<String> {
        self.state.borrow().scoop_config.get(key).cloned()
    }

    /// Every command run so far, rendered as a command line.
    pub fn commands(&self) -> Vec<String> {
        self.log.borrow().iter().map(|c| c.to_string()).collect()
    }

    /// Commands that change machine state.
    pub fn mutating_commands(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|c| is_mutating(c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    fn scoop(&self, args: &[&str]) -> io::Result<CommandOutput> {
        let mut state = self.state.borrow_mut();
        if !state.scoop_available {
            return Err(not_found("scoop"));
        }

        Ok(match args {
            ["--version"] => ok("Current Scoop version:\nv0.5.2\n"),
            ["bucket", "list"] if state.buckets.is_empty() => {
                ok("WARN  No bucket found. Please run 'scoop bucket add main' to add the default 'main' bucket.\n")
            }
            ["bucket", "list"] => {
                let mut out = String::from("\nName Source Updated Manifests\n---- ------ ------- ---------\n");
                for bucket in &state.buckets {
                    out.push_str(&format!("{} https://example.invalid/{} 1/1/2025 100\n", bucket, bucket));
                }
                ok(&out)
            }
            ["bucket", "add", name] => {
                if state.failing.contains(*name) {
                    fail(1, &format!("Failed to clone bucket '{}'", name))
                } else {
                    state.buckets.insert(name.to_string());
                    ok(&format!("The {} bucket was added successfully.", name))
                }
            }
            ["prefix", app] => {
                if state.scoop_apps.contains(*app) {
                    ok(&format!("C:\\Users\\test\\scoop\\apps\\{}\\current\n", app))
                } else {
                    fail(3, &format!("Could not find app path for '{}'.", app))
                }
            }
            ["install", app] => {
                if state.failing.contains(*app) {
                    fail(1, &format!("Couldn't find manifest for '{}'.", app))
                } else {
                    state.scoop_apps.insert(app.to_string());
                    ok(&format!("'{}' was installed successfully!", app))
                }
            }
            ["config", key] => ok(&state
                .scoop_config
                .get(*key)
                .map(|v| format!("{}\n", v))
                .unwrap_or_default()),
            ["config", key, value] => {
                state.scoop_config.insert(key.to_string(), value.to_string());
                ok("")
            }
            _ => fail(1, "Unknown scoop command"),
        })
    }

    fn winget(&self, args: &[&str]) -> io::Result<CommandOutput> {
        let mut state = self.state.borrow_mut();
        let id = args
            .iter()
            .position(|a| *a == "--id")
            .and_then(|i| args.get(i + 1))
            .copied()
            .unwrap_or_default();

        Ok(match args.first() {
            Some(&"list") => {
                if state.winget_ids.contains(id) {
                    ok(&format!("Name Id Version\n----------------\n{} {} 1.0.0\n", id, id))
                } else {
                    CommandOutput {
                        code: Some(WINGET_NO_MATCH),
                        stdout: "No installed package found matching input criteria.\n".into(),
                        stderr: String::new(),
                    }
                }
            }
            Some(&"install") => {
                if state.failing.contains(id) {
                    fail(-1978335216, "No package found matching input criteria.")
                } else {
                    state.winget_ids.insert(id.to_string());
                    ok("Successfully installed")
                }
            }
            _ => fail(1, "Unknown winget command"),
        })
    }

    fn powershell(&self, script: &str) -> io::Result<CommandOutput> {
        let mut state = self.state.borrow_mut();

        if let Some(name) = quoted_after(script, "Get-AppxPackage -Name ") {
            let names = state.appx.get(&name).cloned().unwrap_or_default();
            let mut out = names.join("\n");
            if !out.is_empty() {
                out.push('\n');
            }
            return Ok(ok(&out));
        }

        if let Some(full_name) = quoted_after(script, "Remove-AppxPackage -Package ") {
            let owner = state
                .appx
                .iter()
                .find(|(_, fulls)| fulls.contains(&full_name))
                .map(|(name, _)| name.clone());
            let Some(owner) = owner else {
                return Ok(fail(1, "Package was not found."));
            };
            if state.failing.contains(&owner) || state.failing.contains(&full_name) {
                return Ok(fail(1, "Deployment failed with HRESULT: 0x80073CFA"));
            }
            let now_empty = match state.appx.get_mut(&owner) {
                Some(fulls) => {
                    fulls.retain(|f| f != &full_name);
                    fulls.is_empty()
                }
                None => false,
            };
            if now_empty {
                state.appx.remove(&owner);
            }
            return Ok(ok(""));
        }

        if script.contains("get.scoop.sh") {
            if state.failing.contains("scoop") {
                return Ok(fail(1, "Scoop installation failed"));
            }
            state.scoop_available = true;
            return Ok(ok("Scoop was installed successfully!"));
        }

        Ok(ok(""))
    }

    fn schtasks(&self, args: &[&str]) -> io::Result<CommandOutput> {
        let mut state = self.state.borrow_mut();
        let name = args
            .iter()
            .position(|a| a.eq_ignore_ascii_case("/TN"))
            .and_then(|i| args.get(i + 1))
            .copied()
            .unwrap_or_default();

        Ok(match args.first().map(|a| a.to_ascii_uppercase()).as_deref() {
            Some("/QUERY") => {
                if state.tasks.contains(name) {
                    ok(&format!("TaskName {}\nStatus Ready\n", name))
                } else {
                    fail(1, "ERROR: The system cannot find the file specified.")
                }
            }
            Some("/CREATE") => {
                if state.failing.contains(name) {
                    fail(1, "ERROR: Access is denied.")
                } else {
                    state.tasks.insert(name.to_string());
                    ok(&format!("SUCCESS: The scheduled task \"{}\" has successfully been created.", name))
                }
            }
            _ => fail(1, "ERROR: Invalid syntax."),
        })
    }
}

impl CommandRunner for FakeMachine {
    fn run(&self, command: &CommandSpec) -> io::Result<CommandOutput> {
        if self.state.borrow().missing_tools.contains(&command.program) {
            return Err(not_found(&command.program));
        }
        self.log.borrow_mut().push(command.clone());

        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
        match tool_name(&command.program).as_str() {
            "scoop" => self.scoop(&args),
            "winget" => self.winget(&args),
            "powershell" | "pwsh" => self.powershell(args.last().copied().unwrap_or_default()),
            "schtasks" => self.schtasks(&args),
            "net" if args == ["session"] => Ok(if self.state.borrow().elevated {
                ok("There are no entries in the list.")
            } else {
                fail(2, "System error 5 has occurred.\n\nAccess is denied.")
            }),
            "id" if args == ["-u"] => Ok(ok(if self.state.borrow().elevated { "0\n" } else { "1000\n" })),
            _ => Err(not_found(&command.program)),
        }
    }
}

/// Lowercased file stem of a program path, so `scoop.cmd` and
/// `C:\tools\winget.exe` are recognised.
fn tool_name(program: &str) -> String {
    let file = program.rsplit(['/', '\\']).next().unwrap_or(program);
    let stem = file.split('.').next().unwrap_or(file);
    stem.to_ascii_lowercase()
}

/// Parse the single-quoted PowerShell literal that follows `prefix`.
fn quoted_after(script: &str, prefix: &str) -> Option<String> {
    let start = script.find(prefix)? + prefix.len();
    let mut chars = script[start..].chars().peekable();
    if chars.next()? != '\'' {
        return None;
    }

    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                value.push('\'');
            } else {
                return Some(value);
            }
        } else {
            value.push(c);
        }
    }
    None
}

fn is_mutating(command: &CommandSpec) -> bool {
    let args: Vec<&str> = command.args.iter().map(String::as_str).collect();
    match tool_name(&command.program).as_str() {
        "scoop" => matches!(args.as_slice(), ["install", ..] | ["bucket", "add", ..] | ["config", _, _]),
        "winget" => args.first() == Some(&"install"),
        "powershell" | "pwsh" => args
            .last()
            .is_some_and(|s| s.contains("Remove-AppxPackage") || s.contains("get.scoop.sh")),
        "schtasks" => args.first().is_some_and(|a| a.eq_ignore_ascii_case("/Create")),
        _ => false,
    }
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

fn fail(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

fn not_found(program: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("program not found: {}", program))
}
