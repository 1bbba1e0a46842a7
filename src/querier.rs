//! Service layer for analyzing repositories.
//!
//! `MetricsQuerier` is the main entry point for an analysis. It:
//! 1. Parses the user-supplied repository URL.
//! 2. Fetches a fresh snapshot from GitHub.
//! 3. Derives chart series and the health score from the snapshot.
//! 4. Counts successful analyses.
//!
//! Nothing is cached between requests; each analysis stands on its own.

use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::github::GitHubClient;
use crate::metrics::{self, DerivedMetrics};
use crate::snapshot::{Contributor, Repository};
use crate::types::RepoRef;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Everything the dashboard needs to render one analysis.
#[derive(Debug, Serialize, Clone)]
pub struct AnalysisResponse {
    pub repo: RepoRef,
    pub repository: Repository,
    pub metrics: DerivedMetrics,
    /// The full contributor list, in GitHub's order.
    pub contributors: Vec<Contributor>,
}

#[derive(Clone)]
pub struct MetricsQuerier {
    client: GitHubClient,
    analyzed_count: Arc<AtomicU64>,
}

impl MetricsQuerier {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(GitHubClient::new(config)?))
    }

    pub fn with_client(client: GitHubClient) -> Self {
        Self {
            client,
            analyzed_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Analyzes the repository behind a URL such as `https://github.com/octocat/Hello-World`.
    ///
    /// Invalid input is rejected before any request is made.
    pub async fn analyze_url(&self, input: &str) -> Result<AnalysisResponse, AnalysisError> {
        let repo_ref = RepoRef::parse_url(input).inspect_err(|e| {
            tracing::debug!(input, reason = %e, "Rejected repository URL");
        })?;
        self.analyze(repo_ref).await
    }

    /// Fetches a fresh snapshot and derives its metrics.
    pub async fn analyze(&self, repo_ref: RepoRef) -> Result<AnalysisResponse, AnalysisError> {
        let snapshot = self.client.fetch_snapshot(&repo_ref).await?;
        let metrics = metrics::derive_metrics(&snapshot);

        let count = self.analyzed_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            repo = %repo_ref,
            score = metrics.health.score,
            analyzed = count,
            "Analyzed repository"
        );

        Ok(AnalysisResponse {
            repo: repo_ref,
            repository: snapshot.repository,
            metrics,
            contributors: snapshot.contributors,
        })
    }

    /// Number of analyses that completed successfully since startup.
    pub fn analyzed_count(&self) -> u64 {
        self.analyzed_count.load(Ordering::Relaxed)
    }
}
