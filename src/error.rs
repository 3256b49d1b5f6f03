// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for automergebot

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, AutomergeError>;

/// Main error type for automergebot
#[derive(Error, Debug)]
pub enum AutomergeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Context error: {0}")]
    Context(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: status {status} for {url}")]
    Api { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("UTF-8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Front matter error in {file}: {reason}")]
    FrontMatter { file: String, reason: String },

    #[error("Unexpected encoding '{encoding}' for {file}")]
    Encoding { file: String, encoding: String },

    #[error(
        "Failed to find file at head and base: the requested file '{0}' is either new or was renamed"
    )]
    MissingFile(String),
}

/// Append-only error accumulator for one pipeline run.
///
/// Every check records user-facing problems here instead of raising; the
/// orchestrator reads the log once at the end to decide between merging
/// and commenting. The log is created empty per run and never persisted.
#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: Vec<String>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
