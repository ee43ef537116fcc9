// src/block/merge.rs
// =============================================================================
// Insert, replace, list and remove named blocks in a text document.
//
// The document is treated as plain text. Block positions are found by
// searching for the markers every time; nothing is cached between calls
// because the file may be edited by hand in between.
//
// Rules:
// - start + end present        -> replace that byte range, touch nothing else
// - start without end (or the
//   reverse)                   -> MalformedBlock, document left alone
// - neither                    -> append after the trimmed document,
//                                 separated by one blank line
// - duplicate complete blocks for one identifier (hand edits) are folded
//   into the first one, so a successful upsert always leaves exactly one
//
// Rust concepts:
// - Range<usize>: a block is a byte range into the document string
// - let-else: `let Some(x) = ... else { return ... }` for the "no block" case
// - Pure functions on &str, with thin *_file wrappers doing the I/O
// =============================================================================

use std::fs;
use std::ops::Range;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::{end_marker, render_block, start_marker, validate_id, MARKER_CLOSE, START_PREFIX};
use crate::error::{DocError, DocResult};
use crate::fsio::{read_optional, write_atomic};

/// What upsert_file did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    /// The document did not exist and was created
    Created,
    /// A new block was appended
    Appended,
    /// An existing block was replaced
    Updated,
    /// The block already had exactly this content
    Unchanged,
}

// Byte ranges (markers included) of every complete block for `id`.
fn find_blocks(document: &str, id: &str) -> DocResult<Vec<Range<usize>>> {
    let start = start_marker(id);
    let end = end_marker(id);
    let malformed = || DocError::MalformedBlock { id: id.to_string() };

    let mut spans = Vec::new();
    // Byte offset where the next search begins
    let mut pos = 0;

    // Step 1: pair every start marker with the first end marker after it
    while let Some(found) = document[pos..].find(&start) {
        let block_start = pos + found;
        let body_start = block_start + start.len();

        let end_at = document[body_start..]
            .find(&end)
            .map(|offset| body_start + offset)
            .ok_or_else(malformed)?;

        // A second start marker before our end means this one is unterminated
        if document[body_start..end_at].contains(&start) {
            return Err(malformed());
        }

        // The span covers both markers, so replacing it swaps the whole block
        let block_end = end_at + end.len();
        spans.push(block_start..block_end);
        pos = block_end;
    }

    // Step 2: every end marker must have been consumed by a pair above;
    // a leftover one is an end without a start
    if document.matches(&end).count() != spans.len() {
        return Err(malformed());
    }

    Ok(spans)
}

// Removes a byte range and collapses the blank lines around it.
fn excise(document: &str, span: Range<usize>) -> String {
    // Text before the block, minus the blank lines that separated it
    let before = document[..span.start].trim_end();

    // Text after the block, starting at its first non-blank line

    let rest = &document[span.end..];
    let after = if rest.trim().is_empty() {
        ""
    } else {
        // Drop blank lines but keep the indentation of the next content line
        let blank_len = rest.len() - rest.trim_start().len();
        let cut = rest[..blank_len].rfind('\n').map_or(0, |i| i + 1);
        &rest[cut..]
    };

    // Glue the halves back with exactly one blank line between them
    match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (true, false) => after.to_string(),
        (false, true) => format!("{before}\n"),
        (false, false) => format!("{before}\n\n{after}"),
    }
}

/// Writes `body` as block `id`, replacing any previous version.
pub fn upsert_block(document: &str, id: &str, body: &str) -> DocResult<String> {
    validate_id(id)?;
    if body.contains(&start_marker(id)) || body.contains(&end_marker(id)) {
        return Err(DocError::MalformedBlock { id: id.to_string() });
    }

    let block = render_block(id, body);
    let spans = find_blocks(document, id)?;

    let Some((first, duplicates)) = spans.split_first() else {
        let existing = document.trim_end();
        return Ok(if existing.is_empty() {
            format!("{block}\n")
        } else {
            format!("{existing}\n\n{block}\n")
        });
    };

    // Later spans first so earlier offsets stay valid
    let mut out = document.to_string();
    for span in duplicates.iter().rev() {
        debug!(%id, "folding duplicate block");
        out = excise(&out, span.clone());
    }
    out.replace_range(first.clone(), &block);
    Ok(out)
}

/// Identifiers of every block, in document order.
pub fn list_blocks(document: &str) -> Vec<String> {
    document
        .match_indices(START_PREFIX)
        .filter_map(|(at, _)| {
            let rest = &document[at + START_PREFIX.len()..];
            let line = rest.lines().next().unwrap_or_default();
            let close = line.find(MARKER_CLOSE)?;
            let id = line[..close].trim();
            (!id.is_empty()).then(|| id.to_string())
        })
        .collect()
}

/// Removes block `id`. Returns the new text and whether anything was removed.
pub fn remove_block(document: &str, id: &str) -> DocResult<(String, bool)> {
    validate_id(id)?;
    let spans = find_blocks(document, id)?;
    if spans.is_empty() {
        return Ok((document.to_string(), false));
    }

    let mut out = document.to_string();
    for span in spans.into_iter().rev() {
        out = excise(&out, span);
    }
    Ok((out, true))
}

/// upsert_block on a file; a missing file is created.
pub fn upsert_file(path: &Path, id: &str, body: &str) -> DocResult<UpsertAction> {
    let existing = read_optional(path)?;
    let current = existing.as_deref().unwrap_or_default();

    let had_block = !find_blocks(current, id)?.is_empty();
    let updated = upsert_block(current, id, body)?;

    let action = match (&existing, had_block) {
        (Some(old), _) if *old == updated => return Ok(UpsertAction::Unchanged),
        (None, _) => UpsertAction::Created,
        (Some(_), true) => UpsertAction::Updated,
        (Some(_), false) => UpsertAction::Appended,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DocError::from_io(parent, e))?;
    }
    write_atomic(path, updated.as_bytes())?;
    Ok(action)
}

/// list_blocks on a file; a missing file has no blocks.
pub fn list_file(path: &Path) -> DocResult<Vec<String>> {
    Ok(read_optional(path)?
        .map(|text| list_blocks(&text))
        .unwrap_or_default())
}

/// remove_block on a file; the file must exist.
pub fn remove_file(path: &Path, id: &str) -> DocResult<bool> {
    let Some(document) = read_optional(path)? else {
        return Err(DocError::DocumentNotFound {
            path: path.to_path_buf(),
        });
    };

    let (updated, removed) = remove_block(&document, id)?;
    if removed {
        write_atomic(path, updated.as_bytes())?;
    }
    Ok(removed)
}
