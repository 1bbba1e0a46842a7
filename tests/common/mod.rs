//! In-process stand-in for the GitHub REST API.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header::ACCEPT, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Resource names as they appear in stub overrides; "repository" is the bare repo route.
pub const REPOSITORY: &str = "repository";

#[derive(Default)]
struct StubState {
    overrides: HashMap<&'static str, (StatusCode, Value)>,
    hits: AtomicUsize,
}

pub struct StubGitHub {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubGitHub {
    /// Number of requests the stub has answered.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

/// Serves the default fixture for every resource.
pub async fn spawn() -> StubGitHub {
    spawn_with(Vec::new()).await
}

/// Serves the default fixture except for the overridden resources.
pub async fn spawn_with(overrides: Vec<(&'static str, StatusCode, Value)>) -> StubGitHub {
    let state = Arc::new(StubState {
        overrides: overrides
            .into_iter()
            .map(|(resource, status, body)| (resource, (status, body)))
            .collect(),
        hits: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/repos/{owner}/{repo}", get(repository))
        .route("/repos/{owner}/{repo}/{resource}", get(list))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub listener");
    let addr = listener.local_addr().expect("stub has no local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server failed");
    });

    StubGitHub {
        base_url: format!("http://{}", addr),
        state,
    }
}

pub fn rate_limit_body() -> Value {
    json!({
        "message": "API rate limit exceeded for 127.0.0.1.",
        "documentation_url": "https://docs.github.com/rest/rate-limit"
    })
}

pub fn not_found_body() -> Value {
    json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    })
}

async fn repository(
    Path((owner, repo)): Path<(String, String)>,
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    respond(&state, REPOSITORY, &headers, || {
        json!({
            "id": 1296269,
            "full_name": format!("{}/{}", owner, repo),
            "description": "This your first repo!",
            "html_url": format!("https://github.com/{}/{}", owner, repo),
            "language": "Rust",
            "stargazers_count": 500,
            "forks_count": 42,
            "watchers_count": 500,
            "size": 108,
            "open_issues_count": 1
        })
    })
}

async fn list(
    Path((_owner, _repo, resource)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let resource: &'static str = match resource.as_str() {
        "issues" => "issues",
        "pulls" => "pulls",
        "commits" => "commits",
        "contributors" => "contributors",
        _ => return (StatusCode::NOT_FOUND, Json(not_found_body())),
    };

    if matches!(resource, "issues" | "pulls")
        && query.get("state").map(String::as_str) != Some("all")
    {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "expected state=all" })),
        );
    }

    respond(&state, resource, &headers, || match resource {
        "issues" => json!([
            { "number": 1, "state": "open", "title": "Crash on start" },
            { "number": 2, "state": "closed", "title": "Typo" },
            { "number": 3, "state": "closed", "title": "Docs", "pull_request": {} }
        ]),
        "pulls" => json!([
            { "number": 4, "state": "open", "merged_at": null },
            { "number": 5, "state": "closed", "merged_at": "2024-03-01T12:00:00Z" },
            { "number": 6, "state": "closed", "merged_at": null }
        ]),
        "commits" => json!([
            {
                "sha": "7fd1a60b01f91b314f59955a4e4d4e80d8edf11d",
                "commit": { "message": "Merge pull request #5" }
            },
            {
                "sha": "553c2077f0edc3d5dc5d17262f6aa498e69d6f8e",
                "commit": { "message": "Initial commit" }
            }
        ]),
        _ => json!([
            {
                "login": "octocat",
                "contributions": 40,
                "avatar_url": "https://avatars.githubusercontent.com/u/583231"
            },
            { "login": "hubot", "contributions": 20 },
            { "login": "octocat", "contributions": 3 }
        ]),
    })
}

fn respond(
    state: &StubState,
    resource: &'static str,
    headers: &HeaderMap,
    fixture: impl FnOnce() -> Value,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let accepts_v3 = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("application/vnd.github.v3+json"));
    if !accepts_v3 {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(json!({ "message": "missing v3 Accept header" })),
        );
    }

    match state.overrides.get(resource) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (StatusCode::OK, Json(fixture())),
    }
}
