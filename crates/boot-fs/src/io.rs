//! Atomic file placement

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Copy `source` over `destination` atomically.
///
/// The bytes go to a temp file in the destination directory (same
/// filesystem) which is then renamed into place, so a reader never sees a
/// half-written file. Missing parent directories are created. An existing
/// symlink at `destination` is replaced, not followed.
pub fn copy_atomic(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        destination
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = destination.with_file_name(&temp_name);

    if let Err(e) = fs::copy(source, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(source, e));
    }

    fs::rename(&temp_path, destination).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(destination, e)
    })
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
