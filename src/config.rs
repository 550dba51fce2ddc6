//! Environment-based configuration.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::engine::EngineSettings;

#[derive(Debug, Clone)]
pub struct Config {
    /// Personal access token (or installation token) for the GitHub API.
    pub github_token: String,

    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// Whether to delete a PR's source branch after merging it.
    pub delete_branch_after_merge: bool,

    /// Delay before asking the provider for its mergeability verdict.
    pub mergeable_refresh_delay: Duration,

    /// Upper bound on any single provider call.
    pub provider_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let github_token =
            env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable is required")?;

        let webhook_secret = env::var("WEBHOOK_SECRET")
            .context("WEBHOOK_SECRET environment variable is required")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let delete_branch_after_merge = env::var("DELETE_BRANCH_AFTER_MERGE")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let mergeable_refresh_delay = Duration::from_secs(
            env::var("MERGEABLE_REFRESH_DELAY_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .context("MERGEABLE_REFRESH_DELAY_SECS must be a valid number")?,
        );

        let provider_timeout = Duration::from_secs(
            env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("PROVIDER_TIMEOUT_SECS must be a valid number")?,
        );

        Ok(Config {
            github_token,
            webhook_secret,
            port,
            delete_branch_after_merge,
            mergeable_refresh_delay,
            provider_timeout,
        })
    }

    /// The engine tunables carried by this configuration.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            mergeable_refresh_delay: self.mergeable_refresh_delay,
            provider_timeout: self.provider_timeout,
            delete_branch_after_merge: self.delete_branch_after_merge,
        }
    }
}

/// Parses common truthy spellings; anything else is false.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
