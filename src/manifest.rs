// src/manifest.rs
// =============================================================================
// Downloads a single llms.txt / llm.txt manifest instead of a repository.
//
// Steps:
// 1. Fetch the manifest body as text
// 2. Refuse failed responses and blank manifests
// 3. Create the destination directory
// 4. Prepend a comment naming the source URL, plus a "# <title>" heading when
//    the manifest does not start with one
// 5. Write the result atomically as llms.txt or llm.txt (matching the URL)
//
// The directory is only created once there is something to put in it, so a
// failed fetch leaves nothing behind. Error statuses go through the same
// mapping as GitHub responses (429 -> RateLimited, 401/403 -> AuthFailed).
//
// A manifest always counts as exactly one downloaded file.
//
// Rust concepts:
// - &'static str: the file name is one of two string literals, no allocation
// - pulldown-cmark's event stream: Start/Text/End events instead of a tree
// =============================================================================

use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};
use reqwest::Client;
use tracing::debug;

use crate::config::Settings;
use crate::error::{DocError, DocResult};
use crate::fsio::write_atomic;
use crate::github::status_error;
use crate::source::ManifestSource;

#[derive(Debug, Clone)]
pub struct ManifestOutcome {
    pub file: PathBuf,
    pub file_name: &'static str,
    /// Text of the manifest's first "# " heading, if it had one
    pub heading: Option<String>,
    pub files: usize,
}

pub async fn download_manifest(
    http: &Client,
    settings: &Settings,
    source: &ManifestSource,
    dest_dir: &Path,
) -> DocResult<ManifestOutcome> {
    let url = source.url.as_str();
    debug!(%url, "GET manifest");

    // Manifest hosts are not GitHub, so no bearer token is attached
    let response = http
        .get(source.url.clone())
        .timeout(settings.manifest_timeout)
        .send()
        .await
        .map_err(|e| DocError::from_reqwest(url, e))?;

    if !response.status().is_success() {
        return Err(status_error(url, &response));
    }

    let body = response
        .text()
        .await
        .map_err(|e| DocError::from_reqwest(url, e))?;

    if body.trim().is_empty() {
        return Err(DocError::EmptyManifest {
            url: url.to_string(),
        });
    }

    let heading = first_heading(&body);
    let contents = annotate(&body, url, source.host());

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| DocError::from_io(dest_dir, e))?;

    let file_name = source.file_name();
    let file = dest_dir.join(file_name);
    write_atomic(&file, contents.as_bytes())?;

    Ok(ManifestOutcome {
        file,
        file_name,
        heading,
        files: 1,
    })
}

/// Adds the source comment and, if missing, a top-level heading.
pub fn annotate(body: &str, url: &str, title: &str) -> String {
    let mut out = format!("<!-- Source: {url} -->\n");

    if !body.trim_start().starts_with('#') {
        out.push_str(&format!("# {title}\n\n"));
    }

    out.push_str(body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Text of the first level-1 heading (ATX or setext), if any.
pub fn first_heading(markdown: &str) -> Option<String> {
    let mut current: Option<String> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(HeadingLevel::H1, ..)) => current = Some(String::new()),
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.push_str(&text);
                }
            }
            Event::End(Tag::Heading(HeadingLevel::H1, ..)) => {
                let heading = current.take().unwrap_or_default();
                let heading = heading.trim();
                if !heading.is_empty() {
                    return Some(heading.to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{parse_source, SourceLocator};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manifest(url: &str) -> ManifestSource {
        match parse_source(url).unwrap() {
            SourceLocator::Manifest(m) => m,
            other => panic!("expected manifest, got {other:?}"),
        }
    }

    #[test]
    fn test_annotate_injects_heading() {
        let out = annotate("- [Intro](https://x/intro.md)", "https://x/llms.txt", "x");
        assert_eq!(
            out,
            "<!-- Source: https://x/llms.txt -->\n# x\n\n- [Intro](https://x/intro.md)\n"
        );
    }

    #[test]
    fn test_annotate_keeps_existing_heading() {
        let out = annotate("# Acme\n\nDocs\n", "https://x/llms.txt", "x");
        assert_eq!(out, "<!-- Source: https://x/llms.txt -->\n# Acme\n\nDocs\n");
    }

    #[test]
    fn test_first_heading() {
        assert_eq!(first_heading("# Acme `SDK`\n\ntext").as_deref(), Some("Acme SDK"));
        assert_eq!(first_heading("Acme\n====\n").as_deref(), Some("Acme"));
        assert_eq!(first_heading("## Sub only\n"), None);
        assert_eq!(first_heading("plain text"), None);
    }

    #[tokio::test]
    async fn test_download_manifest_writes_one_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/llms.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("> Summary\n- [A](/a.md)\n"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let source = manifest(&format!("{}/llms.txt", server.uri()));
        let client = Client::new();

        let outcome = download_manifest(&client, &Settings::default(), &source, dir.path())
            .await
            .unwrap();

        assert_eq!(outcome.files, 1);
        assert_eq!(outcome.file_name, "llms.txt");
        assert_eq!(outcome.heading, None);

        let written = std::fs::read_to_string(dir.path().join("llms.txt")).unwrap();
        assert!(written.starts_with("<!-- Source: http://127.0.0.1"));
        assert!(written.contains("# 127.0.0.1\n\n> Summary"));
    }

    #[tokio::test]
    async fn test_blank_manifest_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n\t\n"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let source = manifest(&format!("{}/llm.txt", server.uri()));
        let err = download_manifest(&Client::new(), &Settings::default(), &source, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, DocError::EmptyManifest { .. }));
        assert!(!dir.path().join("llm.txt").exists());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("acme");
        let source = manifest(&format!("{}/llms.txt", server.uri()));
        let err = download_manifest(&Client::new(), &Settings::default(), &source, &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, DocError::Http { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("x-ratelimit-reset", "3661"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let source = manifest(&format!("{}/llms.txt", server.uri()));
        let err = download_manifest(&Client::new(), &Settings::default(), &source, dir.path())
            .await
            .unwrap_err();

        match err {
            DocError::RateLimited { reset_at } => {
                assert_eq!(reset_at.as_deref(), Some("01:01:01 UTC"))
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
