//! Repository identifiers and parsing of user-supplied repository URLs.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

const GITHUB_HOSTS: [&str; 2] = ["github.com", "www.github.com"];

/// Why a user-supplied string was not accepted as a GitHub repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRepoUrl {
    #[error("input is not an absolute URL")]
    NotAUrl,

    #[error("host '{0}' is not github.com")]
    WrongHost(String),

    #[error("URL path has no owner segment")]
    MissingOwner,

    #[error("URL path has no repository segment")]
    MissingName,
}

/// A GitHub repository, addressed by owner and name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// The owner of the repository (e.g., "octocat").
    pub owner: String,
    /// The name of the repository (e.g., "Hello-World").
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Result<Self, InvalidRepoUrl> {
        let owner = owner.trim();
        let name = name.trim();

        if !is_path_segment(owner) {
            return Err(InvalidRepoUrl::MissingOwner);
        }
        if !is_path_segment(name) {
            return Err(InvalidRepoUrl::MissingName);
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Extracts owner and repository name from a URL such as
    /// `https://github.com/octocat/Hello-World/tree/main`.
    ///
    /// The owner and name are the first two non-empty path segments. Anything after
    /// them is ignored, and a trailing `.git` on the name is dropped.
    pub fn parse_url(input: &str) -> Result<Self, InvalidRepoUrl> {
        let url = Url::parse(input.trim()).map_err(|_| InvalidRepoUrl::NotAUrl)?;

        let host = url.host_str().ok_or(InvalidRepoUrl::NotAUrl)?;
        if !GITHUB_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
            return Err(InvalidRepoUrl::WrongHost(host.to_string()));
        }

        let mut segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty());

        let owner = segments.next().ok_or(InvalidRepoUrl::MissingOwner)?;
        let name = segments.next().ok_or(InvalidRepoUrl::MissingName)?;
        let name = name.strip_suffix(".git").unwrap_or(name);

        Self::new(owner, name)
    }
}

/// Owner and repository names are limited to the characters GitHub allows in them.
fn is_path_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_repo_url() {
        let repo = RepoRef::parse_url("https://github.com/octocat/Hello-World").unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.name, "Hello-World");
        assert_eq!(repo.to_string(), "octocat/Hello-World");
    }

    #[test]
    fn test_parse_ignores_trailing_path_and_git_suffix() {
        let repo = RepoRef::parse_url("https://github.com/rust-lang/rust/tree/master/src").unwrap();
        assert_eq!(repo, RepoRef::new("rust-lang", "rust").unwrap());

        let repo = RepoRef::parse_url("  https://www.github.com/tokio-rs/axum.git  ").unwrap();
        assert_eq!(repo, RepoRef::new("tokio-rs", "axum").unwrap());
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let repo = RepoRef::parse_url("https://github.com//octocat//Hello-World/").unwrap();
        assert_eq!(repo, RepoRef::new("octocat", "Hello-World").unwrap());
    }

    #[test]
    fn test_parse_rejects_other_hosts() {
        assert_eq!(
            RepoRef::parse_url("https://example.com/foo/bar"),
            Err(InvalidRepoUrl::WrongHost("example.com".to_string()))
        );
        assert!(matches!(
            RepoRef::parse_url("https://github.com.evil.io/foo/bar"),
            Err(InvalidRepoUrl::WrongHost(_))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(RepoRef::parse_url(""), Err(InvalidRepoUrl::NotAUrl));
        assert_eq!(
            RepoRef::parse_url("github.com/octocat/Hello-World"),
            Err(InvalidRepoUrl::NotAUrl)
        );
        assert_eq!(
            RepoRef::parse_url("https://github.com/"),
            Err(InvalidRepoUrl::MissingOwner)
        );
        assert_eq!(
            RepoRef::parse_url("https://github.com/octocat"),
            Err(InvalidRepoUrl::MissingName)
        );
    }

    #[test]
    fn test_new_rejects_empty_segments() {
        assert_eq!(RepoRef::new(" ", "repo"), Err(InvalidRepoUrl::MissingOwner));
        assert_eq!(RepoRef::new("owner", ""), Err(InvalidRepoUrl::MissingName));
        assert_eq!(RepoRef::new("owner", "a/b"), Err(InvalidRepoUrl::MissingName));
        assert_eq!(RepoRef::new("owner", ".."), Err(InvalidRepoUrl::MissingName));
        assert_eq!(RepoRef::new("own?er", "repo"), Err(InvalidRepoUrl::MissingOwner));
    }
}
