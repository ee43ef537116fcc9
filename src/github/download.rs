// src/github/download.rs
// =============================================================================
// Downloads the selected files one at a time into a local directory.
//
// Strategy:
// - Work out every destination path first, and refuse the whole batch if any
//   of them would land outside the destination directory (a crafted tree path
//   like "docs/../../etc/x.md")
// - Then fetch each file from the raw-content host, sequentially
// - A file that fails (404, timeout, write error) is recorded and skipped;
//   the rest of the batch keeps going
// - Only if nothing at all succeeded is the batch an error
//
// Running out of disk space stops the batch immediately, since every later
// write would fail the same way.
//
// Rust concepts:
// - Generic closure parameter (F: FnMut): the caller decides what progress
//   looks like (a progress bar, a test counter, nothing)
// - collect::<Result<Vec<_>, _>>(): the first Err stops the collection
// - Binding a matched variant with `err @ DocError::DiskFull { .. }`
// =============================================================================

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::client::{status_error, GithubClient};
use super::select::{display_path, Selection};
use crate::error::{DocError, DocResult};

/// What happened to a batch, final once download_selection returns.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub total: usize,
    pub succeeded: usize,
    /// Paths relative to local_root of files that could not be fetched
    pub failed: Vec<String>,
    pub local_root: PathBuf,
}

// One file of the batch with its destination already checked
#[derive(Debug)]
struct PlannedFile {
    repo_path: String,
    relative: String,
    dest: PathBuf,
}

/// Path of a selected file relative to the selection's folder.
///
/// When the selection points straight at a file, that file keeps its name.
pub fn relative_target(effective_path: &str, repo_path: &str) -> String {
    if effective_path.is_empty() {
        return repo_path.to_string();
    }
    if repo_path == effective_path {
        return repo_path
            .rsplit('/')
            .next()
            .unwrap_or(repo_path)
            .to_string();
    }
    repo_path
        .strip_prefix(effective_path)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(repo_path)
        .to_string()
}

/// Joins a slash-separated relative path onto root, rejecting anything that
/// could escape it ("..", absolute paths, drive prefixes).
pub fn resolve_inside(root: &Path, relative: &str) -> DocResult<PathBuf> {
    let traversal = || DocError::PathTraversal {
        path: relative.to_string(),
    };

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for segment in relative.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        // Each segment must be a plain name on this platform too
        // (catches "..\\x" and "C:" on Windows)
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => {
                resolved.push(name);
                depth += 1;
            }
            _ => return Err(traversal()),
        }
    }

    if depth == 0 || !resolved.starts_with(root) {
        return Err(traversal());
    }
    Ok(resolved)
}

/// Downloads every file of the selection into local_root.
///
/// on_progress is called after each file, success or not, with
/// (succeeded so far, total, relative path).
pub async fn download_selection<F>(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    branch: &str,
    selection: &Selection,
    local_root: &Path,
    mut on_progress: F,
) -> DocResult<DownloadOutcome>
where
    F: FnMut(usize, usize, &str),
{
    // Step 1: plan every destination; one bad path rejects the whole batch
    // before any request or write happens
    let plan = selection
        .entries
        .iter()
        .map(|entry| {
            let relative = relative_target(&selection.effective_path, &entry.path);
            let dest = resolve_inside(local_root, &relative)?;
            Ok(PlannedFile {
                repo_path: entry.path.clone(),
                relative,
                dest,
            })
        })
        .collect::<DocResult<Vec<_>>>()?;

    // Step 2: the destination exists even if every file later fails
    tokio::fs::create_dir_all(local_root)
        .await
        .map_err(|e| DocError::from_io(local_root, e))?;

    // Step 3: fetch one file at a time, recording failures
    let total = plan.len();
    let mut succeeded = 0;
    let mut failed = Vec::new();

    for file in &plan {
        match download_one(client, owner, repo, branch, file).await {
            Ok(()) => succeeded += 1,
            Err(err @ DocError::DiskFull { .. }) => return Err(err),
            Err(err) => {
                debug!(path = %file.repo_path, error = %err, "download failed, continuing");
                failed.push(file.relative.clone());
            }
        }
        on_progress(succeeded, total, &file.relative);
    }

    // Step 4: a batch with failures is still a success if anything arrived
    if succeeded == 0 {
        return Err(DocError::DownloadFailed {
            path: display_path(&selection.effective_path),
            total,
        });
    }

    Ok(DownloadOutcome {
        total,
        succeeded,
        failed,
        local_root: local_root.to_path_buf(),
    })
}

async fn download_one(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    branch: &str,
    file: &PlannedFile,
) -> DocResult<()> {
    let url = client.raw_url(owner, repo, branch, &file.repo_path)?;
    let response = client.get(&url, client.settings().file_timeout).await?;

    if !response.status().is_success() {
        return Err(status_error(url.as_str(), &response));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| DocError::from_reqwest(url.as_str(), e))?;

    if let Some(parent) = file.dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DocError::from_io(parent, e))?;
    }
    tokio::fs::write(&file.dest, &body)
        .await
        .map_err(|e| DocError::from_io(&file.dest, e))?;

    debug!(path = %file.relative, bytes = body.len(), "saved");
    Ok(())
}
