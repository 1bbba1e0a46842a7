//! GitHub REST client that assembles a `RepositorySnapshot`.

use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::snapshot::{RawSnapshot, RepositorySnapshot, Resource};
use crate::types::RepoRef;
use anyhow::Result;
use axum::http::header::ACCEPT;
use axum::http::StatusCode;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde_json::Value;

const GITHUB_V3_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// List endpoints that take `?state=all` so closed items are included.
const ALL_STATES: [(&str, &str); 1] = [("state", "all")];

#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Builds a client against `config.github_api_base_url`.
    ///
    /// Octocrab's retry middleware is disabled; a failed request fails the fetch.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = Octocrab::builder()
            .base_uri(config.github_api_base_url.as_str())?
            .add_header(ACCEPT, GITHUB_V3_MEDIA_TYPE.to_string())
            .add_retry_config(RetryConfig::None);
        if let Some(token) = &config.github_token {
            builder = builder.personal_token(token.clone());
        }

        Ok(Self {
            octocrab: builder.build()?,
        })
    }

    /// Fetches the five resources of a repository concurrently and validates them.
    ///
    /// All five requests run to completion. If any of them was rate limited the result is
    /// `RateLimited`, otherwise the first failure in resource order is returned.
    pub async fn fetch_snapshot(
        &self,
        repo_ref: &RepoRef,
    ) -> Result<RepositorySnapshot, AnalysisError> {
        let (repository, issues, pulls, commits, contributors) = futures::join!(
            self.fetch_resource(repo_ref, Resource::Repository),
            self.fetch_resource(repo_ref, Resource::Issues),
            self.fetch_resource(repo_ref, Resource::Pulls),
            self.fetch_resource(repo_ref, Resource::Commits),
            self.fetch_resource(repo_ref, Resource::Contributors),
        );

        let rate_limited = [&repository, &issues, &pulls, &commits, &contributors]
            .into_iter()
            .find_map(|result| match result {
                Err(AnalysisError::RateLimited { resource }) => Some(*resource),
                _ => None,
            });
        if let Some(resource) = rate_limited {
            return Err(AnalysisError::RateLimited { resource });
        }

        let raw = RawSnapshot {
            repository: repository?,
            issues: issues?,
            pulls: pulls?,
            commits: commits?,
            contributors: contributors?,
        };

        let snapshot = RepositorySnapshot::from_raw(raw)?;
        tracing::debug!(
            repo = %repo_ref,
            issues = snapshot.issues.len(),
            pulls = snapshot.pulls.len(),
            commits = snapshot.commits.len(),
            contributors = snapshot.contributors.len(),
            "Fetched repository snapshot"
        );

        Ok(snapshot)
    }

    async fn fetch_resource(
        &self,
        repo_ref: &RepoRef,
        resource: Resource,
    ) -> Result<Value, AnalysisError> {
        let route = resource_route(repo_ref, resource);
        tracing::debug!(repo = %repo_ref, %resource, %route, "Requesting resource");

        let response = match resource {
            Resource::Issues | Resource::Pulls => {
                self.octocrab.get(&route, Some(&ALL_STATES)).await
            }
            _ => self.octocrab.get(&route, None::<&()>).await,
        };

        response.map_err(|e| {
            tracing::warn!(repo = %repo_ref, %resource, "GitHub request failed: {}", e);
            classify_error(resource, e)
        })
    }
}

/// The API path of `resource`, e.g. `/repos/octocat/Hello-World/pulls`.
pub fn resource_route(repo_ref: &RepoRef, resource: Resource) -> String {
    match resource {
        Resource::Repository => format!("/repos/{}/{}", repo_ref.owner, repo_ref.name),
        _ => format!(
            "/repos/{}/{}/{}",
            repo_ref.owner,
            repo_ref.name,
            resource.as_str()
        ),
    }
}

/// 403 and 429 are GitHub's rate limit answers. Everything else is a generic fetch failure.
fn classify_error(resource: Resource, error: octocrab::Error) -> AnalysisError {
    if let octocrab::Error::GitHub { source, .. } = &error {
        if source.status_code == StatusCode::FORBIDDEN
            || source.status_code == StatusCode::TOO_MANY_REQUESTS
        {
            return AnalysisError::RateLimited { resource };
        }
    }

    AnalysisError::FetchFailed {
        resource,
        source: error,
    }
}
