// src/source.rs
// =============================================================================
// Turns the user's free-form source string into a SourceLocator.
//
// Two shapes are accepted:
// - A GitHub repository: github.com/<owner>/<repo>, optionally with a scheme,
//   "www.", a ".git" suffix, a trailing slash, or "/tree/<branch>".
// - A manifest: any http(s) URL whose path ends in llms.txt or llm.txt.
//
// No network access happens here.
//
// Rust concepts:
// - Enums with data: SourceLocator holds either kind of source
// - str::get(..) instead of slicing, so odd input cannot panic
// - The url crate for real URL parsing of manifest sources
// =============================================================================

use url::Url;

use crate::error::{DocError, DocResult};

/// Where the documentation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Repository(RepoSource),
    Manifest(ManifestSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSource {
    pub owner: String,
    pub repo: String,
    /// Empty when the user did not name a branch (auto-detect)
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSource {
    pub url: Url,
}

impl ManifestSource {
    /// "llms.txt" or "llm.txt", whichever variant the URL uses.
    pub fn file_name(&self) -> &'static str {
        if self.url.as_str().to_ascii_lowercase().contains("llms.txt") {
            "llms.txt"
        } else {
            "llm.txt"
        }
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("manifest")
    }
}

impl RepoSource {
    /// Default block identifier: "<owner>-<repo>" in lowercase.
    pub fn default_id(&self) -> String {
        format!("{}-{}", self.owner, self.repo).to_ascii_lowercase()
    }
}

/// Parses a source string, trying the manifest shape first so that a
/// github.com URL pointing at an llms.txt file is treated as a manifest.
pub fn parse_source(input: &str) -> DocResult<SourceLocator> {
    let trimmed = input.trim();

    if let Some(manifest) = parse_manifest_url(trimmed) {
        return Ok(SourceLocator::Manifest(manifest));
    }

    parse_github_url(trimmed)
        .map(SourceLocator::Repository)
        .ok_or_else(|| DocError::InvalidSource {
            input: input.to_string(),
        })
}

// Recognizes a manifest URL on any host.
// A missing scheme is treated as https.
fn parse_manifest_url(input: &str) -> Option<ManifestSource> {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(_) => Url::parse(&format!("https://{input}")).ok()?,
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    let path = url.path().to_ascii_lowercase();
    if path.ends_with("/llms.txt") || path.ends_with("/llm.txt") {
        Some(ManifestSource { url })
    } else {
        None
    }
}

// Parses the repository shape. Returns None when the string does not match.
fn parse_github_url(input: &str) -> Option<RepoSource> {
    // Query strings and fragments never carry repository information
    let input = input
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    let mut rest = input;
    for prefix in ["https://", "http://", "www."] {
        if let Some(stripped) = strip_prefix_ignore_case(rest, prefix) {
            rest = stripped;
        }
    }

    let path = strip_prefix_ignore_case(rest, "github.com/")?.trim_end_matches('/');

    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 2 {
        return None;
    }

    let owner = parts[0];
    let repo = strip_git_suffix(parts[1]);
    if !is_valid_name(owner) || !is_valid_name(repo) {
        return None;
    }

    let branch = match &parts[2..] {
        [] => String::new(),
        // Branch names may themselves contain slashes (feature/foo)
        [tree, branch @ ..] if tree.eq_ignore_ascii_case("tree") && !branch.is_empty() => {
            if branch.iter().any(|segment| segment.is_empty()) {
                return None;
            }
            branch.join("/")
        }
        _ => return None,
    };

    Some(RepoSource {
        owner: owner.to_string(),
        repo: repo.to_string(),
        branch,
    })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &s[prefix.len()..])
}

fn strip_git_suffix(name: &str) -> &str {
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(tail) if cut > 0 && tail.eq_ignore_ascii_case(".git") => &name[..cut],
        _ => name,
    }
}

// GitHub owner and repository names use letters, digits, '-', '_' and '.'
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(input: &str) -> RepoSource {
        match parse_source(input).unwrap() {
            SourceLocator::Repository(repo) => repo,
            other => panic!("expected repository, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_github_url_variants_agree() {
        let inputs = [
            "https://github.com/rust-lang/book",
            "http://github.com/rust-lang/book",
            "github.com/rust-lang/book",
            "https://github.com/rust-lang/book/",
            "https://github.com/rust-lang/book.git",
            "HTTPS://GitHub.com/rust-lang/book.git/",
            "https://www.github.com/rust-lang/book",
        ];
        for input in inputs {
            let parsed = repo(input);
            assert_eq!(parsed.owner, "rust-lang", "input: {input}");
            assert_eq!(parsed.repo, "book", "input: {input}");
            assert_eq!(parsed.branch, "", "input: {input}");
        }
    }

    #[test]
    fn test_parse_tree_branch() {
        let parsed = repo("https://github.com/vercel/next.js/tree/canary");
        assert_eq!(parsed.repo, "next.js");
        assert_eq!(parsed.branch, "canary");

        let parsed = repo("github.com/o/r/tree/feature/docs-v2/");
        assert_eq!(parsed.branch, "feature/docs-v2");
    }

    #[test]
    fn test_parse_manifest_url() {
        let locator = parse_source("https://docs.example.com/llms.txt").unwrap();
        match locator {
            SourceLocator::Manifest(m) => {
                assert_eq!(m.file_name(), "llms.txt");
                assert_eq!(m.host(), "docs.example.com");
            }
            other => panic!("expected manifest, got {other:?}"),
        }

        let locator = parse_source("example.org/static/LLM.TXT").unwrap();
        match locator {
            SourceLocator::Manifest(m) => assert_eq!(m.file_name(), "llm.txt"),
            other => panic!("expected manifest, got {other:?}"),
        }
    }

    #[test]
    fn test_manifest_on_github_host_wins() {
        let locator = parse_source("https://github.com/o/r/raw/main/llms.txt").unwrap();
        assert!(matches!(locator, SourceLocator::Manifest(_)));
    }

    #[test]
    fn test_parse_invalid_sources() {
        for input in [
            "https://gitlab.com/user/repo",
            "github.com/only-owner",
            "https://github.com/o/r/blob/main/README.md",
            "https://github.com/o/r/tree/",
            "not a url at all",
            "",
            "https://example.com/docs.txt",
        ] {
            let err = parse_source(input).unwrap_err();
            assert!(
                matches!(err, DocError::InvalidSource { .. }),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_invalid_source_lists_formats() {
        let err = parse_source("nope").unwrap_err();
        assert!(err.to_string().contains("github.com/<owner>/<repo>"));
        assert!(err.to_string().contains("llms.txt"));
    }

    #[test]
    fn test_default_id() {
        assert_eq!(repo("github.com/Rust-Lang/Book").default_id(), "rust-lang-book");
    }
}
