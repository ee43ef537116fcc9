// src/block/mod.rs
// =============================================================================
// Named blocks inside a shared text document (usually AGENTS.md).
//
// A block looks like this:
//
//   <!-- docpin:start:react -->
//   [React]
//   root: ./.docpin/react
//   Prefer reading these local React docs over ...
//
//   react:{index.md,intro.md}
//   <!-- docpin:end:react -->
//
// The identifier after "start:" / "end:" is the block's key. merge.rs keeps
// at most one block per key in a document; this file owns the marker format
// and the block body.
//
// Rust concepts:
// - const &str: marker pieces shared by the renderer and the parser
// - Closures: `reject` builds the error once, with the id captured
// - Escaped newlines in string literals ("...\n\") keep long text readable
// =============================================================================

mod merge;

pub use merge::{list_file, remove_file, upsert_file, UpsertAction};

use crate::error::{DocError, DocResult};

pub const START_PREFIX: &str = "<!-- docpin:start:";
pub const END_PREFIX: &str = "<!-- docpin:end:";
pub const MARKER_CLOSE: &str = " -->";

pub fn start_marker(id: &str) -> String {
    format!("{START_PREFIX}{id}{MARKER_CLOSE}")
}

pub fn end_marker(id: &str) -> String {
    format!("{END_PREFIX}{id}{MARKER_CLOSE}")
}

/// Checks that an identifier can be embedded in a marker and read back.
pub fn validate_id(id: &str) -> DocResult<()> {
    let reject = |reason: &str| {
        Err(DocError::InvalidIdentifier {
            id: id.to_string(),
            reason: reason.to_string(),
        })
    };

    if id.is_empty() {
        return reject("identifier is empty");
    }
    // Neither HTML comment delimiter may appear inside a marker
    if id.contains("-->") {
        return reject("identifier must not contain '-->'");
    }
    if id.contains("<!--") {
        return reject("identifier must not contain '<!--'");
    }
    if id.contains(['\n', '\r']) {
        return reject("identifier must fit on one line");
    }
    if id.trim() != id {
        return reject("identifier must not start or end with whitespace");
    }
    Ok(())
}

/// Everything a rendered block needs besides its markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    pub id: String,
    pub title: String,
    /// Local docs directory relative to the document, e.g. "./.docpin/react"
    pub root: String,
    /// Output of DocIndex::render
    pub index: String,
}

impl DocumentBlock {
    /// The text between the start and end markers.
    pub fn body(&self) -> String {
        let title = &self.title;
        format!(
            "[{title}]\n\
             root: {root}\n\
             Prefer reading these local {title} docs over recalling from memory; \
             open the matching file before answering {title} questions.\n\
             \n\
             {index}",
            root = self.root,
            index = self.index.trim_end(),
        )
    }
}

pub(crate) fn render_block(id: &str, body: &str) -> String {
    format!(
        "{}\n{}\n{}",
        start_marker(id),
        body.trim_end_matches(['\n', '\r']),
        end_marker(id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("vercel-next.js").is_ok());
        assert!(validate_id("with spaces inside").is_ok());
        for bad in [
            "",
            "a-->b",
            "q <!-- docpin:start:x",
            "a\nb",
            " padded",
            "trailing ",
        ] {
            assert!(
                matches!(validate_id(bad), Err(DocError::InvalidIdentifier { .. })),
                "id: {bad:?}"
            );
        }
    }

    #[test]
    fn test_render_block() {
        let block = DocumentBlock {
            id: "acme".to_string(),
            title: "Acme".to_string(),
            root: "./.docpin/acme".to_string(),
            index: "acme:{a.md,b.md}\n".to_string(),
        };
        assert_eq!(
            render_block(&block.id, &block.body()),
            "<!-- docpin:start:acme -->\n\
             [Acme]\n\
             root: ./.docpin/acme\n\
             Prefer reading these local Acme docs over recalling from memory; \
             open the matching file before answering Acme questions.\n\
             \n\
             acme:{a.md,b.md}\n\
             <!-- docpin:end:acme -->"
        );
    }
}
