//! Config file placement
//!
//! A manifest record may carry file operations that copy or link
//! configuration files into place. Operations run in order; a failure is
//! logged against its source path and never stops the remaining ones.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{ApplyMode, Error, PathResolver, Result, checksum, io};

/// How a file is placed at its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOpKind {
    Copy,
    Link,
}

/// One file placement as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperation {
    pub source: String,
    pub destination: String,
    #[serde(rename = "type")]
    pub kind: FileOpKind,
}

/// Result of a single file operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Copied,
    Linked,
    Unchanged,
    WouldCopy,
    WouldLink,
    Failed { message: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Copied | Self::Linked)
    }
}

/// Report for one file operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub source: String,
    /// Resolved destination, when resolution got that far
    pub destination: Option<PathBuf>,
    pub kind: FileOpKind,
    pub outcome: FileOutcome,
}

/// Places config files described by [`FileOperation`]s.
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'a> {
    resolver: PathResolver<'a>,
    mode: ApplyMode,
}

impl<'a> Materializer<'a> {
    pub fn new(resolver: PathResolver<'a>, mode: ApplyMode) -> Self {
        Self { resolver, mode }
    }

    /// Apply every operation in order, isolating failures per operation.
    pub fn materialize(&self, operations: &[FileOperation]) -> Vec<FileReport> {
        operations
            .iter()
            .map(|op| {
                let mut destination = None;
                let outcome = match self.apply(op, &mut destination) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(source = %op.source, error = %e, "Failed to place config file");
                        FileOutcome::Failed {
                            message: e.to_string(),
                        }
                    }
                };
                FileReport {
                    source: op.source.clone(),
                    destination,
                    kind: op.kind,
                    outcome,
                }
            })
            .collect()
    }

    fn apply(&self, op: &FileOperation, resolved: &mut Option<PathBuf>) -> Result<FileOutcome> {
        // Link targets are read relative to the link, not the process.
        let source = self.resolver.anchor(self.resolver.resolve(&op.source)?);
        let destination = self
            .resolver
            .anchor(self.resolver.resolve_destination(&op.destination)?);
        *resolved = Some(destination.clone());

        match op.kind {
            FileOpKind::Copy => self.copy(&source, &destination),
            FileOpKind::Link => self.link(&source, &destination),
        }
    }

    fn copy(&self, source: &Path, destination: &Path) -> Result<FileOutcome> {
        let meta = fs::metadata(source).map_err(|e| Error::io(source, e))?;

        let changed = if meta.is_dir() {
            copy_tree(source, destination, self.mode)?
        } else {
            copy_file(source, destination, self.mode)?
        };

        Ok(match (changed, self.mode) {
            (false, _) => {
                debug!(destination = %destination.display(), "Already up to date");
                FileOutcome::Unchanged
            }
            (true, ApplyMode::DryRun) => FileOutcome::WouldCopy,
            (true, ApplyMode::Apply) => {
                info!(source = %source.display(), destination = %destination.display(), "Copied");
                FileOutcome::Copied
            }
        })
    }

    fn link(&self, source: &Path, destination: &Path) -> Result<FileOutcome> {
        match destination.parent() {
            Some(parent) if parent.as_os_str().is_empty() || parent.is_dir() => {}
            _ => {
                return Err(Error::MissingParent {
                    path: destination.to_path_buf(),
                });
            }
        }

        let existing = fs::symlink_metadata(destination).ok();
        if let Some(meta) = &existing {
            if meta.file_type().is_symlink()
                && fs::read_link(destination).is_ok_and(|target| target == source)
            {
                debug!(destination = %destination.display(), "Link already in place");
                return Ok(FileOutcome::Unchanged);
            }
        }

        if self.mode.is_dry_run() {
            return Ok(FileOutcome::WouldLink);
        }

        if let Some(meta) = existing {
            remove_entry(destination, &meta)?;
        }
        create_symlink(source, destination)?;

        info!(source = %source.display(), destination = %destination.display(), "Linked");
        Ok(FileOutcome::Linked)
    }
}

/// Copy one file unless the destination already matches. Returns whether
/// a copy was (or in dry-run, would be) made.
fn copy_file(source: &Path, destination: &Path, mode: ApplyMode) -> Result<bool> {
    let is_regular_file = fs::symlink_metadata(destination)
        .map(|m| m.file_type().is_file())
        .unwrap_or(false);

    if is_regular_file
        && checksum::same_content(source, destination).map_err(|e| Error::io(destination, e))?
    {
        return Ok(false);
    }

    if mode == ApplyMode::Apply {
        io::copy_atomic(source, destination)?;
    }
    Ok(true)
}

fn copy_tree(source: &Path, destination: &Path, mode: ApplyMode) -> Result<bool> {
    let mut changed = false;
    let entries = fs::read_dir(source).map_err(|e| Error::io(source, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(source, e))?;
        let from = entry.path();
        let to = destination.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| Error::io(&from, e))?;

        changed |= if file_type.is_dir() {
            copy_tree(&from, &to, mode)?
        } else {
            copy_file(&from, &to, mode)?
        };
    }

    if !changed && mode == ApplyMode::Apply && !destination.exists() {
        fs::create_dir_all(destination).map_err(|e| Error::io(destination, e))?;
        changed = true;
    }
    Ok(changed)
}

fn remove_entry(path: &Path, meta: &fs::Metadata) -> Result<()> {
    let result = if meta.file_type().is_symlink() {
        // Directory symlinks on Windows must be removed as directories.
        fs::remove_file(path).or_else(|_| fs::remove_dir(path))
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::io(path, e))
}

#[cfg(unix)]
fn create_symlink(source: &Path, destination: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, destination).map_err(|e| Error::LinkFailed {
        path: destination.to_path_buf(),
        source: e,
        hint: "",
    })
}

#[cfg(windows)]
fn create_symlink(source: &Path, destination: &Path) -> Result<()> {
    let result = if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, destination)
    } else {
        std::os::windows::fs::symlink_file(source, destination)
    };
    result.map_err(|e| Error::LinkFailed {
        path: destination.to_path_buf(),
        source: e,
        hint: " (symbolic links need an elevated shell or Developer Mode)",
    })
}
