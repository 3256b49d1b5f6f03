// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration and run context for automergebot
//!
//! # Security considerations
//!
//! - The GitHub token is read from the `GITHUB_TOKEN` environment variable
//!   and passed only to `bearer_auth()`. It is never logged, serialized, or
//!   included in error messages.

use crate::error::{AutomergeError, Result};

/// The only event type the bot will act on.
pub const EVENT_PULL_REQUEST: &str = "pull_request";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub API base URL (for GitHub Enterprise support and tests)
    pub github_api_url: String,

    /// Bearer token for the hosting API
    pub token: Option<String>,
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            github_api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            token: std::env::var("GITHUB_TOKEN").ok(),
        }
    }
}

/// Immutable snapshot of the pull request a run operates on.
///
/// Built once from the triggering CI event (or from CLI flags for local,
/// dry-run evaluation) and passed explicitly through the pipeline.
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
    pub base_sha: String,
    pub head_sha: String,
}

/// Optional per-field overrides for [`PullRequestContext::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub pr_number: Option<u64>,
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
}

impl PullRequestContext {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        pr_number: u64,
        base_sha: impl Into<String>,
        head_sha: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            pr_number,
            base_sha: base_sha.into(),
            head_sha: head_sha.into(),
        }
    }

    /// Build the context from the CI event environment, rejecting any run
    /// that was not triggered by a pull-request event.
    pub fn from_env() -> Result<Self> {
        let event = std::env::var("GITHUB_EVENT_NAME").unwrap_or_default();
        ensure_pull_request_event(&event)?;
        Self::resolve(ContextOverrides::default())
    }

    /// Build the context from explicit overrides, falling back to the
    /// environment per field. Does not check the event name; this is the
    /// entry point for local evaluation.
    pub fn resolve(overrides: ContextOverrides) -> Result<Self> {
        let pr_number = match overrides.pr_number {
            Some(number) => number,
            None => std::env::var("PULL_NUMBER")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .ok_or_else(|| {
                    AutomergeError::Context(
                        "run does not have a pull request number associated with it".to_string(),
                    )
                })?,
        };

        Ok(Self {
            owner: or_env(overrides.owner, "REPO_OWNER_NAME")?,
            repo: or_env(overrides.repo, "REPO_NAME")?,
            pr_number,
            base_sha: or_env(overrides.base_sha, "BASE_SHA")?,
            head_sha: or_env(overrides.head_sha, "HEAD_SHA")?,
        })
    }
}

/// Fail fast on anything that is not a pull-request event.
pub fn ensure_pull_request_event(event: &str) -> Result<()> {
    if event != EVENT_PULL_REQUEST {
        return Err(AutomergeError::Context(format!(
            "only events of type {} are allowed, got '{}'",
            EVENT_PULL_REQUEST, event
        )));
    }
    Ok(())
}

fn or_env(value: Option<String>, var: &str) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => std::env::var(var)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AutomergeError::Context(format!("missing context value {}", var))),
    }
}
