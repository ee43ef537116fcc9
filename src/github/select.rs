// src/github/select.rs
// =============================================================================
// Picks which files of a repository tree to download.
//
// - With an explicit path, that path is used as-is (outer slashes stripped)
// - Without one, the first top-level folder named like a documentation folder
//   (docs, doc, documentation, guide, guides; any case) is used
// - With neither, the whole repository is searched
//
// Only Markdown files (.md, .mdx, .markdown) under the chosen path are kept.
//
// Rust concepts:
// - Iterator chains: filter / cloned / collect
// - find_map: first folder name that matches, in priority order
// =============================================================================

use super::tree::TreeEntry;
use crate::error::{DocError, DocResult};

/// Conventional documentation folder names, in priority order.
pub const DOC_FOLDERS: [&str; 5] = ["docs", "doc", "documentation", "guide", "guides"];

/// Extensions treated as documentation, compared case-insensitively.
pub const DOC_EXTENSIONS: [&str; 3] = ["md", "mdx", "markdown"];

#[derive(Debug, Clone)]
pub struct Selection {
    /// Repository-relative folder the files were taken from ("" = root)
    pub effective_path: String,
    /// File entries only, in tree order
    pub entries: Vec<TreeEntry>,
    pub auto_detected: bool,
}

/// True when the path has one of the documentation extensions.
pub fn is_doc_file(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => DOC_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate)),
        _ => false,
    }
}

pub fn select_docs(tree: &[TreeEntry], requested_path: &str) -> DocResult<Selection> {
    let requested = requested_path.trim().trim_matches('/');

    let (effective_path, auto_detected) = if requested.is_empty() {
        match detect_doc_folder(tree) {
            Some(folder) => (folder, true),
            None => (String::new(), false),
        }
    } else {
        (requested.to_string(), false)
    };

    let prefix = format!("{effective_path}/");
    let entries: Vec<TreeEntry> = tree
        .iter()
        .filter(|entry| entry.is_file())
        .filter(|entry| {
            effective_path.is_empty()
                || entry.path == effective_path
                || entry.path.starts_with(&prefix)
        })
        .filter(|entry| is_doc_file(&entry.path))
        .cloned()
        .collect();

    if entries.is_empty() {
        return Err(DocError::NoDocumentFiles {
            path: display_path(&effective_path),
        });
    }

    Ok(Selection {
        effective_path,
        entries,
        auto_detected,
    })
}

/// "/" for the repository root, the path itself otherwise.
pub fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

// Returns the original-case path of the best-ranked top-level doc folder.
fn detect_doc_folder(tree: &[TreeEntry]) -> Option<String> {
    let top_level_dirs: Vec<&TreeEntry> = tree
        .iter()
        .filter(|entry| entry.is_dir() && !entry.path.contains('/'))
        .collect();

    DOC_FOLDERS.iter().find_map(|name| {
        top_level_dirs
            .iter()
            .find(|entry| entry.path.eq_ignore_ascii_case(name))
            .map(|entry| entry.path.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::tree::EntryKind;

    fn file(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: EntryKind::File,
            size: Some(1),
        }
    }

    fn dir(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: EntryKind::Directory,
            size: None,
        }
    }

    fn paths(selection: &Selection) -> Vec<&str> {
        selection.entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_auto_detects_docs() {
        let tree = vec![
            dir("docs"),
            dir("src"),
            file("readme.md"),
            file("docs/intro.md"),
            file("src/lib.rs"),
        ];
        let selection = select_docs(&tree, "").unwrap();
        assert_eq!(selection.effective_path, "docs");
        assert!(selection.auto_detected);
        assert_eq!(paths(&selection), vec!["docs/intro.md"]);
    }

    #[test]
    fn test_auto_detect_respects_priority_and_case() {
        let tree = vec![
            dir("Guides"),
            dir("Documentation"),
            file("Guides/a.md"),
            file("Documentation/b.md"),
        ];
        let selection = select_docs(&tree, "/").unwrap();
        assert_eq!(selection.effective_path, "Documentation");
        assert!(selection.auto_detected);
    }

    #[test]
    fn test_nested_docs_folder_is_not_auto_detected() {
        let tree = vec![dir("packages"), dir("packages/docs"), file("packages/docs/a.md")];
        let selection = select_docs(&tree, "").unwrap();
        assert_eq!(selection.effective_path, "");
        assert!(!selection.auto_detected);
        assert_eq!(paths(&selection), vec!["packages/docs/a.md"]);
    }

    #[test]
    fn test_requested_path_is_used_verbatim() {
        let tree = vec![
            dir("docs"),
            dir("website"),
            file("docs/a.md"),
            file("website/guide.MDX"),
            file("website/notes.markdown"),
            file("website/logo.png"),
            file("websites/other.md"),
        ];
        let selection = select_docs(&tree, "/website/").unwrap();
        assert_eq!(selection.effective_path, "website");
        assert!(!selection.auto_detected);
        assert_eq!(
            paths(&selection),
            vec!["website/guide.MDX", "website/notes.markdown"]
        );
    }

    #[test]
    fn test_requested_single_file() {
        let tree = vec![file("README.md"), file("README.md.bak")];
        let selection = select_docs(&tree, "README.md").unwrap();
        assert_eq!(paths(&selection), vec!["README.md"]);
    }

    #[test]
    fn test_no_docs_names_the_path() {
        let tree = vec![dir("docs"), file("docs/logo.svg")];
        let err = select_docs(&tree, "").unwrap_err();
        match err {
            DocError::NoDocumentFiles { path } => assert_eq!(path, "docs"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_doc_file() {
        assert!(is_doc_file("a/b/README.MD"));
        assert!(is_doc_file("x.mdx"));
        assert!(is_doc_file("x.Markdown"));
        assert!(!is_doc_file("x.md.txt"));
        assert!(!is_doc_file(".md"));
        assert!(!is_doc_file("md"));
    }
}
