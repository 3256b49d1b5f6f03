// SPDX-License-Identifier: PMPL-1.0-or-later

//! GitHub API client module
//!
//! # Security considerations
//!
//! - The GitHub token is passed only to `bearer_auth()`. It is never logged,
//!   serialized, or included in error messages.
//! - No retries are performed here; callers decide whether a failed call is
//!   fatal to the run.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::error::{AutomergeError, Result};

/// GitHub API client
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.github_api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);

        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        request
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "automergebot")
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AutomergeError::Api {
                status: status.as_u16(),
                url: response.url().to_string(),
            })
        }
    }

    /// Compare two commits, returning the file-level changes between them.
    pub async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison> {
        let url = format!(
            "{}/repos/{}/{}/compare/{}...{}",
            self.base_url, owner, repo, base, head
        );
        let response = self.request(Method::GET, &url).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    /// Get a single commit, including its file-level changes.
    pub async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<CommitInfo> {
        let url = format!("{}/repos/{}/{}/commits/{}", self.base_url, owner, repo, sha);
        let response = self.request(Method::GET, &url).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    /// Fetch and decode the raw content a comparison entry points at.
    ///
    /// The contents API returns base64-encoded bodies; any other encoding
    /// is rejected.
    pub async fn fetch_file_content(&self, file: &FileChange) -> Result<String> {
        let response = self.request(Method::GET, &file.contents_url).send().await?;
        let content: ContentFile = Self::expect_success(response).await?.json().await?;

        if content.encoding != "base64" {
            return Err(AutomergeError::Encoding {
                file: file.filename.clone(),
                encoding: content.encoding,
            });
        }

        // The API wraps base64 bodies across lines
        let packed: String = content.content.split_whitespace().collect();
        Ok(String::from_utf8(BASE64.decode(packed)?)?)
    }

    /// Get a pull request
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest> {
        let url = format!("{}/repos/{}/{}/pulls/{}", self.base_url, owner, repo, number);
        let response = self.request(Method::GET, &url).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    /// List the reviews submitted on a pull request
    pub async fn list_reviews(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Review>> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/reviews",
            self.base_url, owner, repo, number
        );
        let response = self.request(Method::GET, &url).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    /// Squash-merge a pull request
    pub async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        sha: &str,
        commit_title: &str,
        commit_message: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/merge",
            self.base_url, owner, repo, number
        );
        let payload = MergeRequest {
            commit_title: commit_title.to_string(),
            commit_message: commit_message.to_string(),
            merge_method: "squash".to_string(),
            sha: sha.to_string(),
        };

        let response = self
            .request(Method::PUT, &url)
            .json(&payload)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Request reviews from the given users
    pub async fn request_reviewers(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/requested_reviewers",
            self.base_url, owner, repo, number
        );
        let payload = ReviewerRequest {
            reviewers: reviewers.to_vec(),
        };

        let response = self
            .request(Method::POST, &url)
            .json(&payload)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// List the comments on an issue (a PR's discussion thread)
    pub async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<IssueComment>> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, owner, repo, number
        );
        let response = self.request(Method::GET, &url).send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    /// Create a comment on an issue
    pub async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, owner, repo, number
        );
        let payload = CommentBody {
            body: body.to_string(),
        };

        let response = self
            .request(Method::POST, &url)
            .json(&payload)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Update an existing issue comment in place
    pub async fn update_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: u64,
        body: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.base_url, owner, repo, comment_id
        );
        let payload = CommentBody {
            body: body.to_string(),
        };

        let response = self
            .request(Method::PATCH, &url)
            .json(&payload)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Login of the account the token belongs to
    pub async fn get_authenticated_user(&self) -> Result<String> {
        let url = format!("{}/user", self.base_url);
        let response = self.request(Method::GET, &url).send().await?;
        let user: User = Self::expect_success(response).await?.json().await?;
        Ok(user.login)
    }

    /// Resolve an email address to a login via the user search API.
    ///
    /// Only an unambiguous single hit is trusted; zero hits or several hits
    /// both yield `None` so the caller falls back to the raw email.
    pub async fn search_user_by_email(&self, email: &str) -> Result<Option<String>> {
        let url = format!("{}/search/users", self.base_url);
        let response = self
            .request(Method::GET, &url)
            .query(&[("q", email)])
            .send()
            .await?;
        let results: UserSearch = Self::expect_success(response).await?.json().await?;

        match results.items.as_slice() {
            [user] => Ok(Some(user.login.clone())),
            [] => Ok(None),
            _ => {
                warn!(
                    "email search matched {} accounts; treating author as unresolved",
                    results.total_count
                );
                Ok(None)
            }
        }
    }
}

/// Result of a commit comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub files: Vec<FileChange>,
}

/// A single commit with its file-level changes.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub files: Vec<FileChange>,
}

/// One file-level entry of a commit comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub status: String,
    pub contents_url: String,
}

/// Contents API response (base64 body).
#[derive(Debug, Deserialize)]
pub struct ContentFile {
    pub content: String,
    pub encoding: String,
}

/// Pull request fields the pipeline depends on.
///
/// Fields are deserialized from the API response schema; the base repo
/// reference carries the merge target for forked PRs.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub user: Option<User>,
    #[serde(default)]
    pub merged: bool,
    pub mergeable_state: Option<String>,
    pub base: PrRef,
    pub head: PrRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrRef {
    pub sha: String,
    pub repo: Option<RepoRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoRef {
    pub name: String,
    pub full_name: String,
    pub owner: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// One submitted review.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub user: Option<User>,
    pub state: String,
}

/// One comment on an issue thread.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub user: Option<User>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserSearch {
    total_count: u64,
    items: Vec<User>,
}

#[derive(Debug, Serialize)]
struct MergeRequest {
    commit_title: String,
    commit_message: String,
    merge_method: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct ReviewerRequest {
    reviewers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CommentBody {
    body: String,
}
