//! Expansion of manifest-supplied paths
//!
//! Manifest paths are written portably: either slash works as a separator,
//! `$NAME` / `${NAME}` pull in environment variables, and destinations may
//! carry a `{username}` placeholder. Resolution turns them into concrete
//! platform-native paths.

use std::path::{Component, MAIN_SEPARATOR_STR, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{EnvSnapshot, Error, Result};

/// Literal placeholder replaced by the current user name in destinations.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// What to do when a path references an undefined variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvePolicy {
    /// Substitute the empty string and log a warning
    #[default]
    Permissive,
    /// Fail with [`Error::UndefinedVariable`]
    Strict,
}

/// Resolves raw manifest paths against an [`EnvSnapshot`].
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    env: &'a EnvSnapshot,
    policy: ResolvePolicy,
}

impl<'a> PathResolver<'a> {
    pub fn new(env: &'a EnvSnapshot) -> Self {
        Self {
            env,
            policy: ResolvePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ResolvePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Expand variables and normalise separators.
    ///
    /// Under the permissive policy an undefined variable leaves an empty
    /// segment behind, so `$UNSET/sub` becomes `/sub` and `$HOME/$UNSET/x`
    /// becomes `$HOME//x` (equivalent to `$HOME/x`).
    ///
    /// A result starting with `.` is made absolute against the snapshot's
    /// working directory.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf> {
        let segments = raw
            .split(['/', '\\'])
            .map(|segment| self.expand_segment(segment, raw))
            .collect::<Result<Vec<_>>>()?;

        let joined = segments
            .join(MAIN_SEPARATOR_STR)
            .replace(['/', '\\'], MAIN_SEPARATOR_STR);

        if joined.starts_with('.') {
            let absolute = normalize_lexically(&self.env.cwd().join(&joined));
            return Ok(dunce::simplified(&absolute).to_path_buf());
        }

        Ok(PathBuf::from(joined))
    }

    /// Like [`resolve`](Self::resolve), after substituting
    /// [`USERNAME_PLACEHOLDER`] with the snapshot's user name.
    pub fn resolve_destination(&self, raw: &str) -> Result<PathBuf> {
        if !raw.contains(USERNAME_PLACEHOLDER) {
            return self.resolve(raw);
        }

        let user = match (self.env.user_name(), self.policy) {
            (Some(user), _) => user,
            (None, ResolvePolicy::Strict) => {
                return Err(Error::UnknownUser { raw: raw.to_string() });
            }
            (None, ResolvePolicy::Permissive) => {
                warn!(path = raw, "No user name in environment, substituting empty string");
                ""
            }
        };

        self.resolve(&raw.replace(USERNAME_PLACEHOLDER, user))
    }

    /// Anchor a still-relative path at the snapshot's working directory.
    pub fn anchor(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() || path.has_root() {
            return path;
        }
        self.env.cwd().join(path)
    }

    fn expand_segment(&self, segment: &str, raw: &str) -> Result<String> {
        let mut out = String::with_capacity(segment.len());
        let mut rest = segment;

        while let Some(idx) = rest.find('$') {
            out.push_str(&rest[..idx]);
            let after = &rest[idx + 1..];

            let (name, consumed) = match parse_variable(after) {
                Some(found) => found,
                None => {
                    out.push('$');
                    rest = after;
                    continue;
                }
            };

            match self.env.var(name) {
                Some(value) => out.push_str(value),
                None => match self.policy {
                    ResolvePolicy::Strict => {
                        return Err(Error::UndefinedVariable {
                            name: name.to_string(),
                            raw: raw.to_string(),
                        });
                    }
                    ResolvePolicy::Permissive => {
                        warn!(variable = name, path = raw, "Undefined environment variable, substituting empty string");
                    }
                },
            }
            rest = &after[consumed..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Parse a variable reference following a `$`.
///
/// Returns the variable name and how many bytes of `input` it spans.
fn parse_variable(input: &str) -> Option<(&str, usize)> {
    if let Some(braced) = input.strip_prefix('{') {
        let end = braced.find('}')?;
        let name = &braced[..end];
        return is_identifier(name).then_some((name, end + 2));
    }

    let end = input
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let name = &input[..end];
    is_identifier(name).then_some((name, end))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Remove `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
