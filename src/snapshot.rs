//! The validated bundle of repository data a single analysis works on.
//!
//! Upstream JSON is fetched untyped and checked here, once, at the fetch boundary. Fields
//! outside the expected shape are ignored; missing or ill-typed expected fields reject the
//! whole snapshot.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// The five upstream resources that make up a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Repository,
    Issues,
    Pulls,
    Commits,
    Contributors,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Repository => "repository",
            Resource::Issues => "issues",
            Resource::Pulls => "pulls",
            Resource::Commits => "commits",
            Resource::Contributors => "contributors",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unexpected shape in {resource} response: {source}")]
    Shape {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },
}

/// Open/closed status shared by issues and pull requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub watchers_count: u64,
    /// Repository size in kilobytes, as reported by GitHub.
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub state: ItemState,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub state: ItemState,
    /// Set when the pull request was merged. A merged pull request is also `Closed`.
    #[serde(default, deserialize_with = "deserialize_merged_at")]
    pub merged_at: Option<DateTime<Utc>>,
}

/// `null`, an empty string and anything that is not an RFC 3339 timestamp all mean "not merged".
fn deserialize_merged_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|t| t.with_timezone(&Utc)))
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
}

#[derive(Deserialize)]
struct CommitRecord {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

impl From<CommitRecord> for Commit {
    fn from(record: CommitRecord) -> Self {
        Self {
            sha: record.sha,
            message: record.commit.message,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Untyped upstream bodies, addressed by resource rather than arrival order.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub repository: Value,
    pub issues: Value,
    pub pulls: Value,
    pub commits: Value,
    pub contributors: Value,
}

/// One immutable bundle of repository data for a single analysis.
///
/// `issues` is taken as GitHub returns it, which means it may also contain pull requests.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepositorySnapshot {
    pub repository: Repository,
    pub issues: Vec<Issue>,
    pub pulls: Vec<PullRequest>,
    pub commits: Vec<Commit>,
    pub contributors: Vec<Contributor>,
}

impl RepositorySnapshot {
    pub fn from_raw(raw: RawSnapshot) -> Result<Self, SnapshotError> {
        let repository = decode(Resource::Repository, raw.repository)?;
        let issues = decode(Resource::Issues, raw.issues)?;
        let pulls = decode(Resource::Pulls, raw.pulls)?;
        let commits = decode::<Vec<CommitRecord>>(Resource::Commits, raw.commits)?
            .into_iter()
            .map(Commit::from)
            .collect();
        let contributors = dedup_contributors(decode(Resource::Contributors, raw.contributors)?);

        Ok(Self {
            repository,
            issues,
            pulls,
            commits,
            contributors,
        })
    }
}

fn decode<T: DeserializeOwned>(resource: Resource, value: Value) -> Result<T, SnapshotError> {
    serde_json::from_value(value).map_err(|source| SnapshotError::Shape { resource, source })
}

/// Keeps the first entry for each login.
fn dedup_contributors(mut contributors: Vec<Contributor>) -> Vec<Contributor> {
    let mut seen = HashSet::new();
    contributors.retain(|c| seen.insert(c.login.clone()));
    contributors
}
