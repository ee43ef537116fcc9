// src/index/walk.rs
// =============================================================================
// Collects the Markdown files under a local directory.
//
// Skipped at every depth:
// - hidden entries (name starts with '.')
// - node_modules directories
// - anything that is not .md / .mdx / .markdown
//
// Returned paths are relative to the root, with '/' separators.
//
// Rust concepts:
// - ignore::WalkBuilder: a recursive directory walker
// - filter_entry: returning false prunes a whole directory
// - let-else for skipping entries that cannot be made relative
// =============================================================================

use std::path::Path;

use ignore::{DirEntry, WalkBuilder};

use crate::error::{DocError, DocResult};
use crate::github::is_doc_file;

/// Directory names never descended into.
pub const SKIPPED_DIRS: [&str; 1] = ["node_modules"];

pub fn collect_doc_files(root: &Path) -> DocResult<Vec<String>> {
    if !root.is_dir() {
        return Err(DocError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    // Our own filtering only; .gitignore files in the docs tree are not honored
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| DocError::Walk {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if is_doc_file(&relative) {
            files.push(relative);
        }
    }

    Ok(files)
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_some_and(|t| t.is_dir()) && SKIPPED_DIRS.contains(&&*name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_skips_hidden_and_dependency_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "a.md");
        touch(root, "guide/b.mdx");
        touch(root, "guide/image.png");
        touch(root, ".hidden.md");
        touch(root, ".git/notes.md");
        touch(root, "guide/.cache/c.md");
        touch(root, "node_modules/pkg/README.md");
        touch(root, "guide/node_modules/x.md");

        let mut files = collect_doc_files(root).unwrap();
        files.sort();
        assert_eq!(files, vec!["a.md", "guide/b.mdx"]);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = collect_doc_files(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, DocError::DirectoryNotFound { .. }));
    }
}
