pub mod config;
pub mod error;
pub mod github;
pub mod metrics;
pub mod querier;
pub mod snapshot;
pub mod types;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use config::AppConfig;
use error::AnalysisError;
use querier::{AnalysisResponse, MetricsQuerier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use types::RepoRef;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct StatsResponse {
    analyzed_repos: u64,
}

#[derive(Deserialize)]
pub struct AnalyzeParams {
    url: String,
}

#[derive(Deserialize)]
pub struct RepoPath {
    owner: String,
    repo: String,
}

/// Shared application state accessible to all request handlers.
pub struct AppState {
    /// Service for analyzing repositories.
    pub querier: MetricsQuerier,
    /// Application configuration loaded from environment variables.
    pub config: AppConfig,
}

impl AppState {
    /// Initializes the application state, including the GitHub client.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let querier = MetricsQuerier::new(&config)?;
        Ok(Self { querier, config })
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let static_dir = &state.config.static_dir;
    let index = ServeFile::new(format!("{}/index.html", static_dir));
    let serve_dir = ServeDir::new(static_dir).not_found_service(index);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/stats", get(get_stats))
        .route("/api/analyze", get(analyze_url))
        .route("/api/repos/{owner}/{repo}/analysis", get(analyze_repo))
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "gitinsight-backend",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        analyzed_repos: state.querier.analyzed_count(),
    })
}

pub async fn analyze_url(
    Query(params): Query<AnalyzeParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalysisResponse>, (StatusCode, String)> {
    state
        .querier
        .analyze_url(&params.url)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn analyze_repo(
    Path(path): Path<RepoPath>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalysisResponse>, (StatusCode, String)> {
    let repo_ref = RepoRef::new(&path.owner, &path.repo)
        .map_err(|e| error_response(AnalysisError::from(e)))?;

    state
        .querier
        .analyze(repo_ref)
        .await
        .map(Json)
        .map_err(error_response)
}

fn error_response(e: AnalysisError) -> (StatusCode, String) {
    match &e {
        AnalysisError::InvalidInput(_) => tracing::debug!("Rejected analysis request: {:?}", e),
        _ => tracing::error!("Analysis failed: {:?}", e),
    }
    (e.status_code(), e.to_string())
}
