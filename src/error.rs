//! Error taxonomy for a single repository analysis.

use crate::snapshot::{Resource, SnapshotError};
use crate::types::InvalidRepoUrl;
use axum::http::StatusCode;
use thiserror::Error;

/// Terminal failure of one analysis attempt. The `Display` text is the message shown to users.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input was not a GitHub repository URL. Detected before any network call.
    #[error("Please enter a valid GitHub repository URL.")]
    InvalidInput(#[source] InvalidRepoUrl),

    /// GitHub refused a request because the API quota is exhausted.
    #[error("GitHub API rate limit exceeded. Please try again later.")]
    RateLimited { resource: Resource },

    /// Any other upstream or network failure.
    #[error("Failed to fetch repository data")]
    FetchFailed {
        resource: Resource,
        #[source]
        source: octocrab::Error,
    },

    /// The upstream data did not have the expected shape.
    #[error("Failed to process repository data")]
    AggregationFailed(#[from] SnapshotError),
}

impl From<InvalidRepoUrl> for AnalysisError {
    fn from(e: InvalidRepoUrl) -> Self {
        Self::InvalidInput(e)
    }
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::AggregationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
