// src/error.rs
// =============================================================================
// The error type shared by every docpin module.
//
// Each variant names the resource involved and, where it helps, what the user
// can do about it. main.rs turns any of these into exit status 1.
//
// The one failure that is NOT an error here is a single file failing inside a
// batch download: that is recorded in DownloadOutcome::failed instead.
//
// Rust concepts:
// - thiserror: #[derive(Error)] writes the Display impl from #[error(...)]
// - #[source]: keeps the underlying error for {:#} chains
// - Matching on io::ErrorKind to pick a more specific variant
// =============================================================================

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type DocResult<T> = Result<T, DocError>;

#[derive(Debug, Error)]
pub enum DocError {
    #[error(
        "invalid source '{input}'. Accepted formats:\n  \
         github.com/<owner>/<repo>\n  \
         https://github.com/<owner>/<repo>[.git]\n  \
         https://github.com/<owner>/<repo>/tree/<branch>\n  \
         https://<host>/<path>/llms.txt (or llm.txt)"
    )]
    InvalidSource { input: String },

    #[error(
        "repository {owner}/{repo} not found (tried branches: {}). \
         Check the name, or pass --branch if the default branch has another name",
        .tried.join(", ")
    )]
    RepositoryNotFound {
        owner: String,
        repo: String,
        tried: Vec<String>,
    },

    #[error("request to {url} timed out; try again later")]
    NetworkTimeout { url: String },

    #[error(
        "GitHub API rate limit exceeded{}; set GITHUB_TOKEN or pass --token to raise the limit",
        .reset_at.as_deref().map(|t| format!(" (resets at {t})")).unwrap_or_default()
    )]
    RateLimited { reset_at: Option<String> },

    #[error("authentication failed for {url} (HTTP {status}); check your token")]
    AuthFailed { url: String, status: u16 },

    #[error(
        "no Markdown files (.md, .mdx, .markdown) found under '{path}'; \
         pass --path to point at the documentation folder"
    )]
    NoDocumentFiles { path: String },

    #[error("refusing to write '{path}': it resolves outside the destination directory")]
    PathTraversal { path: String },

    #[error(
        "none of the {total} files under '{path}' could be downloaded. \
         The path may be wrong, or the files there may be unavailable"
    )]
    DownloadFailed { path: String, total: usize },

    #[error("manifest at {url} is empty")]
    EmptyManifest { url: String },

    #[error(
        "block '{id}' has a start marker but no matching end marker; \
         fix or delete the marker by hand before retrying"
    )]
    MalformedBlock { id: String },

    #[error("invalid block identifier '{id}': {reason}")]
    InvalidIdentifier { id: String, reason: String },

    #[error("document {} does not exist", .path.display())]
    DocumentNotFound { path: PathBuf },

    #[error("directory {} does not exist", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("no space left on device while writing {}", .path.display())]
    DiskFull { path: PathBuf },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl DocError {
    /// Classifies a filesystem error against the path it happened on.
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => DocError::PermissionDenied { path },
            io::ErrorKind::StorageFull => DocError::DiskFull { path },
            _ => DocError::Io { path, source: err },
        }
    }

    /// Classifies a transport error from reqwest.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DocError::NetworkTimeout {
                url: url.to_string(),
            }
        } else {
            DocError::Http {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_permission_maps_to_permission_denied() {
        let err = DocError::from_io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, DocError::PermissionDenied { .. }));
    }

    #[test]
    fn test_io_storage_full_maps_to_disk_full() {
        let err = DocError::from_io("/x", io::Error::from(io::ErrorKind::StorageFull));
        assert!(matches!(err, DocError::DiskFull { .. }));
    }

    #[test]
    fn test_io_other_stays_io() {
        let err = DocError::from_io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, DocError::Io { .. }));
    }

    #[test]
    fn test_repository_not_found_lists_branches() {
        let err = DocError::RepositoryNotFound {
            owner: "o".into(),
            repo: "r".into(),
            tried: vec!["main".into(), "master".into()],
        };
        assert!(err.to_string().contains("main, master"));
    }

    #[test]
    fn test_rate_limited_mentions_reset_time() {
        let err = DocError::RateLimited {
            reset_at: Some("12:00:00 UTC".into()),
        };
        assert!(err.to_string().contains("resets at 12:00:00 UTC"));

        let err = DocError::RateLimited { reset_at: None };
        assert!(!err.to_string().contains("resets at"));
    }

    #[test]
    fn test_download_failed_keeps_both_causes() {
        let err = DocError::DownloadFailed {
            path: "docs".into(),
            total: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("path may be wrong"));
        assert!(msg.contains("unavailable"));
    }
}
