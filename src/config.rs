//! Application configuration and environment variable parsing.
//!
//! Settings are read from the environment (optionally seeded from a .env file). Every
//! setting has a default, so an empty environment yields a working configuration that
//! talks to the public GitHub API anonymously.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Root of the GitHub REST API. Overridable for GitHub Enterprise or local stubs.
    #[serde(default = "default_github_api_base_url")]
    pub github_api_base_url: String,

    /// Optional GitHub Personal Access Token for higher rate limits.
    pub github_token: Option<String>,

    /// Directory holding the built dashboard frontend.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_port() -> u16 {
    3000
}

fn default_github_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_static_dir() -> String {
    "dist".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            github_api_base_url: default_github_api_base_url(),
            github_token: None,
            static_dir: default_static_dir(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
