// src/github/client.rs
// =============================================================================
// A thin wrapper around reqwest for GitHub requests.
//
// Responsibilities:
// - Attach the bearer token (if any) to every request
// - Build API and raw-content URLs with correctly encoded path segments
// - Turn transport errors and non-success statuses into DocError
//
// Status handling:
// - 401                          -> AuthFailed
// - 403/429 with quota exhausted -> RateLimited (with reset time)
// - other 403                    -> AuthFailed
// - anything else                -> Http
//
// A 404 is NOT classified here: the tree fetcher treats it as "try the next
// branch", and the downloader records it as a per-file failure.
//
// Rust concepts:
// - Builder pattern: reqwest's RequestBuilder, one method per option
// - Closures that borrow: `header` reads from the response it captures
// - chrono::DateTime for turning a Unix timestamp into a clock time
// =============================================================================

use std::time::Duration;

use chrono::DateTime;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::error::{DocError, DocResult};

pub struct GithubClient {
    http: Client,
    settings: Settings,
}

impl GithubClient {
    pub fn new(settings: Settings) -> DocResult<Self> {
        let http = settings.http_client()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// URL of the recursive tree listing for a branch.
    pub fn tree_url(&self, owner: &str, repo: &str, branch: &str) -> DocResult<Url> {
        let mut url = join_segments(
            &self.settings.api_url,
            ["repos", owner, repo, "git", "trees", branch],
        )?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    /// URL serving the raw bytes of one file at a branch.
    pub fn raw_url(&self, owner: &str, repo: &str, branch: &str, path: &str) -> DocResult<Url> {
        let segments = [owner, repo]
            .into_iter()
            .chain(branch.split('/'))
            .chain(path.split('/'));
        join_segments(&self.settings.raw_url, segments)
    }

    /// Sends a GET and returns the response whatever its status.
    /// Only transport failures (timeout, DNS, TLS, ...) become errors here.
    pub async fn get(&self, url: &Url, timeout: Duration) -> DocResult<Response> {
        debug!(%url, "GET");

        let mut request = self.http.get(url.clone()).timeout(timeout);
        if let Some(token) = self.settings.bearer_token() {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .map_err(|e| DocError::from_reqwest(url.as_str(), e))
    }
}

// Appends path segments to a base URL, percent-encoding each one.
fn join_segments<'a>(base: &str, segments: impl IntoIterator<Item = &'a str>) -> DocResult<Url> {
    let invalid = |message: String| DocError::Http {
        url: base.to_string(),
        message,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(format!("invalid base URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| invalid("base URL cannot have a path".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Maps a non-success, non-404 response to the matching error.
pub fn status_error(url: &str, response: &Response) -> DocError {
    let status = response.status();
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let quota_exhausted = header("x-ratelimit-remaining").as_deref() == Some("0");

    match status {
        StatusCode::TOO_MANY_REQUESTS => DocError::RateLimited {
            reset_at: header("x-ratelimit-reset").and_then(|v| format_reset(&v)),
        },
        StatusCode::FORBIDDEN if quota_exhausted => DocError::RateLimited {
            reset_at: header("x-ratelimit-reset").and_then(|v| format_reset(&v)),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DocError::AuthFailed {
            url: url.to_string(),
            status: status.as_u16(),
        },
        _ => DocError::Http {
            url: url.to_string(),
            message: format!("HTTP {}", status.as_u16()),
        },
    }
}

// x-ratelimit-reset is a Unix timestamp in seconds
fn format_reset(raw: &str) -> Option<String> {
    let secs = raw.trim().parse::<i64>().ok()?;
    let at = DateTime::from_timestamp(secs, 0)?;
    Some(at.format("%H:%M:%S UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GithubClient {
        GithubClient::new(Settings::default()).unwrap()
    }

    #[test]
    fn test_tree_url() {
        let url = client().tree_url("o", "r", "main").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/o/r/git/trees/main?recursive=1"
        );
    }

    #[test]
    fn test_tree_url_encodes_slashed_branch() {
        let url = client().tree_url("o", "r", "feature/x").unwrap();
        assert!(url.as_str().contains("/git/trees/feature%2Fx?"));
    }

    #[test]
    fn test_raw_url_encodes_segments() {
        let url = client()
            .raw_url("o", "r", "main", "docs/getting started.md")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/o/r/main/docs/getting%20started.md"
        );
    }

    #[test]
    fn test_format_reset() {
        assert_eq!(format_reset("0").as_deref(), Some("00:00:00 UTC"));
        assert_eq!(format_reset("3661").as_deref(), Some("01:01:01 UTC"));
        assert_eq!(format_reset("soon"), None);
    }
}
