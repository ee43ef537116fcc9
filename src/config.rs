// src/config.rs
// =============================================================================
// Runtime settings for talking to GitHub and to manifest hosts.
//
// Production values live in Settings::default(). The CLI overrides them from
// flags and environment variables, and tests point the base URLs at a local
// mock server.
//
// Rust concepts:
// - impl Default: one place for the production values
// - Struct update syntax (..Default::default()) to override a few fields
// - Option<&str> from Option<String> with as_deref()
// =============================================================================

use std::time::Duration;

use reqwest::Client;

use crate::error::{DocError, DocResult};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the GitHub REST API
    pub api_url: String,
    /// Base URL serving raw file contents
    pub raw_url: String,
    /// Optional bearer token sent with every GitHub request
    pub token: Option<String>,
    pub tree_timeout: Duration,
    pub file_timeout: Duration,
    pub manifest_timeout: Duration,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            token: None,
            tree_timeout: Duration::from_secs(30),
            file_timeout: Duration::from_secs(15),
            manifest_timeout: Duration::from_secs(30),
            user_agent: format!("docpin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Builds the one HTTP client shared by every request in a run.
    ///
    /// Timeouts are set per request, not here, because the tree call and the
    /// file calls use different limits.
    pub fn http_client(&self) -> DocResult<Client> {
        Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| DocError::Http {
                url: self.api_url.clone(),
                message: format!("could not build HTTP client: {e}"),
            })
    }

    /// Token with surrounding whitespace removed; blank tokens count as none.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
