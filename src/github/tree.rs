// src/github/tree.rs
// =============================================================================
// Fetches the full file tree of a repository, with branch fallback.
//
// How it works:
// 1. Build the candidate list: the requested branch (if any), then
//    main, master, develop, dev, with duplicates removed
// 2. Ask the GitHub trees API for each candidate in order
// 3. 404 -> that branch does not exist, try the next one
//    success -> stop, that is the actual branch
//    anything else (timeout, rate limit, auth, ...) -> stop with the error
// 4. If every candidate 404s, the repository is reported as not found
//
// One request per attempt, no retries.
//
// Rust concepts:
// - serde Deserialize: the JSON response maps straight onto TreeResponse
// - #[serde(other)]: unknown "type" values land in one catch-all variant
// - A private enum (Attempt) makes "branch missing" a value, not an error
// =============================================================================

use std::collections::HashSet;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::client::{status_error, GithubClient};
use crate::error::{DocError, DocResult};

/// Branch names tried after the requested one, in order.
pub const FALLBACK_BRANCHES: [&str; 4] = ["main", "master", "develop", "dev"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One path in the repository tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Slash-separated, relative to the repository root
    pub path: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A resolved tree and the branch it came from.
#[derive(Debug, Clone)]
pub struct RepoTree {
    pub entries: Vec<TreeEntry>,
    pub branch: String,
    /// GitHub capped the listing; entries is incomplete
    pub truncated: bool,
}

// Wire format of GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=1
#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<RawEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    path: String,
    #[serde(rename = "type")]
    kind: RawKind,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Blob,
    Tree,
    // Submodules show up as "commit"; they have no content to download
    #[serde(other)]
    Other,
}

// Result of a single branch attempt
enum Attempt {
    Found(TreeResponse),
    BranchMissing,
}

/// The ordered, de-duplicated list of branches to try.
pub fn candidate_branches(preferred: &str) -> Vec<String> {
    let preferred = preferred.trim();
    let mut seen = HashSet::new();

    std::iter::once(preferred)
        .filter(|b| !b.is_empty())
        .chain(FALLBACK_BRANCHES)
        .filter(|b| seen.insert(*b))
        .map(str::to_string)
        .collect()
}

/// Fetches the tree, walking the branch candidates until one resolves.
pub async fn fetch_tree(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    preferred_branch: &str,
) -> DocResult<RepoTree> {
    // Step 1: requested branch first, then the usual defaults
    let candidates = candidate_branches(preferred_branch);

    // Step 2: try them in order; `?` stops the loop on any real error
    for branch in &candidates {
        match try_branch(client, owner, repo, branch).await? {
            Attempt::Found(response) => {
                if response.truncated {
                    warn!(
                        "GitHub truncated the tree of {}/{} at '{}'; some files may be missing",
                        owner, repo, branch
                    );
                }
                return Ok(RepoTree {
                    entries: convert_entries(response.tree),
                    branch: branch.clone(),
                    truncated: response.truncated,
                });
            }
            Attempt::BranchMissing => {
                debug!(%branch, "branch not found, trying next candidate");
            }
        }
    }

    // Step 3: every candidate was a 404
    Err(DocError::RepositoryNotFound {
        owner: owner.to_string(),
        repo: repo.to_string(),
        tried: candidates,
    })
}

async fn try_branch(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    branch: &str,
) -> DocResult<Attempt> {
    let url = client.tree_url(owner, repo, branch)?;
    let response = client.get(&url, client.settings().tree_timeout).await?;

    match response.status() {
        status if status.is_success() => {
            let body = response
                .json::<TreeResponse>()
                .await
                .map_err(|e| DocError::from_reqwest(url.as_str(), e))?;
            Ok(Attempt::Found(body))
        }
        StatusCode::NOT_FOUND => Ok(Attempt::BranchMissing),
        _ => Err(status_error(url.as_str(), &response)),
    }
}

// Keeps files and directories, drops submodules, and guarantees unique paths.
fn convert_entries(raw: Vec<RawEntry>) -> Vec<TreeEntry> {
    let mut seen = HashSet::new();

    raw.into_iter()
        .filter_map(|entry| {
            let kind = match entry.kind {
                RawKind::Blob => EntryKind::File,
                RawKind::Tree => EntryKind::Directory,
                RawKind::Other => return None,
            };
            Some(TreeEntry {
                path: entry.path,
                kind,
                size: entry.size,
            })
        })
        .filter(|entry| seen.insert(entry.path.clone()))
        .collect()
}
