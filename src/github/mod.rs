// src/github/mod.rs
// =============================================================================
// This module pulls Markdown documentation out of GitHub repositories.
//
// Pipeline (each step is its own file):
// - client:   reqwest wrapper (token, URL building, status -> error)
// - tree:     list every path at a branch, with branch fallback
// - select:   pick the documentation folder and the Markdown files in it
// - download: fetch the selected files into a local directory
//
// Everything runs sequentially: one request at a time, in pipeline order.
//
// Rust concepts:
// - Private submodules with `pub use`: callers see one flat API
// =============================================================================

mod client;
mod download;
mod select;
mod tree;

pub use client::{status_error, GithubClient};
pub use download::{download_selection, resolve_inside};
pub use select::{display_path, is_doc_file, select_docs};
pub use tree::fetch_tree;
