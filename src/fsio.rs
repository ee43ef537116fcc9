// src/fsio.rs
// =============================================================================
// Small filesystem helpers shared by the manifest writer, the block merger and
// the `add` command.
//
// - write_atomic: write to a temp file in the same directory, then rename it
//   over the destination, so readers never see a half-written file
// - read_optional: read a text file, treating "missing" as None
// - relative_path: how one path looks when seen from a given directory
//   (e.g. ".docpin/react" seen from "docs" is "../.docpin/react")
//
// Rust concepts:
// - Path vs PathBuf: borrowed vs owned paths, like &str vs String
// - Component: one piece of a path ("..", ".", "/", or a plain name)
// - Matching on io::ErrorKind to treat one specific error as "not an error"
// =============================================================================

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{DocError, DocResult};

/// Atomically replaces `path` with `data`.
pub fn write_atomic(path: &Path, data: &[u8]) -> DocResult<()> {
    // The temp file must live on the same filesystem as the destination,
    // otherwise the final rename is not atomic
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DocError::from_io(dir, e))?;
    tmp.write_all(data).map_err(|e| DocError::from_io(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| DocError::from_io(path, e))?;

    // persist() renames the temp file over `path`; on failure the temp
    // file is deleted when `tmp` is dropped
    tmp.persist(path)
        .map_err(|e| DocError::from_io(path, e.error))?;
    Ok(())
}

/// Reads a UTF-8 file; Ok(None) when it does not exist.
pub fn read_optional(path: &Path) -> DocResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DocError::from_io(path, e)),
    }
}

/// `to` expressed relative to the directory `from_dir`.
///
/// Both paths are made absolute against the current directory and cleaned
/// up lexically ("." dropped, ".." applied) before comparing, so neither of
/// them has to exist yet. When the two share no root at all (different
/// drives on Windows) the absolute form of `to` is returned.
pub fn relative_path(from_dir: &Path, to: &Path) -> DocResult<PathBuf> {
    let from = lexical_absolute(from_dir)?;
    let to = lexical_absolute(to)?;

    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();

    // Length of the common leading run, e.g. "/home/me" for
    // "/home/me/docs" and "/home/me/.docpin/react"
    let shared = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if shared == 0 {
        return Ok(to);
    }

    // Climb out of whatever is left of `from`, then walk down into `to`
    let mut relative = PathBuf::new();
    for _ in shared..from_parts.len() {
        relative.push("..");
    }
    for part in &to_parts[shared..] {
        relative.push(part.as_os_str());
    }
    Ok(relative)
}

// Absolute form of `path` with "." and ".." resolved without touching the disk
fn lexical_absolute(path: &Path) -> DocResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| DocError::from_io(path, e))?
            .join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}
