// src/gitignore.rs
// =============================================================================
// Keeps the local docs directory out of version control.
//
// This is a convenience: callers log a failure here and carry on, it never
// decides whether a command succeeded.
//
// Rust concepts:
// - Iterator::any to check for an existing line
// - Returning bool inside DocResult: "did anything change?"
// =============================================================================

use std::fs;
use std::path::Path;

use crate::error::{DocError, DocResult};
use crate::fsio::read_optional;

/// Appends `entry` to the .gitignore in `dir` unless it is already listed.
/// Returns true when the file was changed.
pub fn ensure_ignored(dir: &Path, entry: &str) -> DocResult<bool> {
    let path = dir.join(".gitignore");
    let existing = read_optional(&path)?.unwrap_or_default();

    let wanted = normalize(entry);
    if existing.lines().any(|line| normalize(line) == wanted) {
        return Ok(false);
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&format!("{}/\n", wanted));

    fs::write(&path, updated).map_err(|e| DocError::from_io(&path, e))?;
    Ok(true)
}

// ".docpin", "/.docpin/" and ".docpin/" all mean the same directory
fn normalize(line: &str) -> &str {
    line.trim().trim_start_matches("./").trim_matches('/')
}
