// src/index/mod.rs
// =============================================================================
// Builds the compressed directory index of a local docs folder.
//
// Output, one line per directory that directly contains docs:
//
//   react-docs:{index.md,intro.md}
//   react-docs/hooks:{use-effect.md,use-state.md}
//
// The root folder's own name comes first, then every other directory in
// sorted order, and the files of each line are sorted too. The same folder
// contents therefore always produce the exact same text.
//
// Rust concepts:
// - BTreeMap / BTreeSet: sorted collections, so iteration order is the
//   output order and no explicit sort step is needed
// - impl Into<String>: accept both &str and String for the root name
// =============================================================================

mod walk;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use walk::collect_doc_files;

use crate::error::{DocError, DocResult};

/// Directory (relative, "" for the root) -> sorted file names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocIndex {
    /// Display name of the root directory
    root_name: String,
    dirs: BTreeMap<String, BTreeSet<String>>,
}

impl DocIndex {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            dirs: BTreeMap::new(),
        }
    }

    /// Records one slash-separated path relative to the root.
    pub fn insert(&mut self, relative_path: &str) {
        let relative_path = relative_path.trim_matches('/');
        let (dir, file) = match relative_path.rsplit_once('/') {
            Some((dir, file)) => (dir, file),
            None => ("", relative_path),
        };
        if file.is_empty() {
            return;
        }
        self.dirs
            .entry(dir.to_string())
            .or_default()
            .insert(file.to_string());
    }

    pub fn file_count(&self) -> usize {
        self.dirs.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Serializes the index. BTreeMap order puts the "" root key first.
    pub fn render(&self) -> String {
        self.dirs
            .iter()
            .map(|(dir, files)| {
                let display = if dir.is_empty() {
                    self.root_name.clone()
                } else {
                    format!("{}/{}", self.root_name, dir)
                };
                let files = files.iter().map(String::as_str).collect::<Vec<_>>().join(",");
                format!("{display}:{{{files}}}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Walks `root` and indexes every Markdown file under it.
pub fn build_index(root: &Path) -> DocResult<DocIndex> {
    build_named_index(root, root_display_name(root))
}

/// Like build_index, but lines start with `name` instead of root's basename.
///
/// Used when the files sit in a staging folder whose name is not the one
/// they will finally live under.
pub fn build_named_index(root: &Path, name: impl Into<String>) -> DocResult<DocIndex> {
    // Step 1: relative paths of every doc file, hidden folders skipped
    let files = collect_doc_files(root)?;

    // Step 2: group them by directory
    let mut index = DocIndex::new(name);
    for file in &files {
        index.insert(file);
    }

    if index.is_empty() {
        return Err(DocError::NoDocumentFiles {
            path: root.display().to_string(),
        });
    }
    Ok(index)
}

// The root's own basename; falls back to the canonical path for "." and ".."
fn root_display_name(root: &Path) -> String {
    let name = match root.file_name() {
        Some(name) => Some(name.to_os_string()),
        None => root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_os_string())),
    };
    name.map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "docs".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn docs_dir(files: &[&str]) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("acme");
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "# doc").unwrap();
        }
        (dir, root)
    }

    #[test]
    fn test_root_files_are_sorted() {
        let (_dir, root) = docs_dir(&["z.md", "a.md", "m.md"]);
        assert_eq!(build_index(&root).unwrap().render(), "acme:{a.md,m.md,z.md}");
    }

    #[test]
    fn test_root_first_then_sorted_dirs() {
        let (_dir, root) = docs_dir(&[
            "zeta/b.md",
            "alpha/nested/c.mdx",
            "readme.md",
            "alpha/a.md",
            "alpha/image.png",
        ]);
        let index = build_index(&root).unwrap();
        assert_eq!(
            index.render(),
            "acme:{readme.md}\n\
             acme/alpha:{a.md}\n\
             acme/alpha/nested:{c.mdx}\n\
             acme/zeta:{b.md}"
        );
        assert_eq!(index.file_count(), 4);
    }

    #[test]
    fn test_render_is_stable_across_runs() {
        let (_dir, root) = docs_dir(&["b/x.md", "a/y.md", "c.md", "b/a.md"]);
        let first = build_index(&root).unwrap().render();
        let second = build_index(&root).unwrap().render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_docs_is_an_error() {
        let (_dir, root) = docs_dir(&["image.png", ".hidden/a.md"]);
        let err = build_index(&root).unwrap_err();
        assert!(matches!(err, DocError::NoDocumentFiles { .. }));
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = build_index(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DocError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_named_index_uses_given_root_name() {
        let (_dir, root) = docs_dir(&["guide/a.md", "b.md"]);
        assert_eq!(
            build_named_index(&root, "widgets").unwrap().render(),
            "widgets:{b.md}\nwidgets/guide:{a.md}"
        );
    }

    #[test]
    fn test_manual_index_for_manifest() {
        let mut index = DocIndex::new("vercel-com");
        index.insert("llms.txt");
        assert_eq!(index.render(), "vercel-com:{llms.txt}");
    }
}
