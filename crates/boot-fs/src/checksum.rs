//! SHA-256 content comparison
//!
//! Used to skip copies whose destination already holds the same bytes.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

const PREFIX: &str = "sha256:";

/// Compute the streaming SHA-256 checksum of a file, as `"sha256:<hex>"`.
pub fn file_checksum(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// True when both files exist and hold identical content.
///
/// Sizes are compared first so differing files are usually rejected
/// without hashing.
pub fn same_content(a: &Path, b: &Path) -> std::io::Result<bool> {
    let (meta_a, meta_b) = (std::fs::metadata(a)?, std::fs::metadata(b)?);
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    Ok(file_checksum(a)? == file_checksum(b)?)
}
