// SPDX-License-Identifier: PMPL-1.0-or-later

//! Document diff resolution
//!
//! Pairs the parsed front matter of one EIP file at the base and head of a
//! PR, resolving raw author entries into normalized identifiers along the
//! way. Author-email lookups hit the user search API once per unique entry,
//! concurrently.

use std::collections::BTreeSet;

use tokio::task::JoinSet;
use tracing::warn;

use crate::error::{AutomergeError, Result};
use crate::frontmatter;
use crate::github::{FileChange, GitHubClient};
use crate::patterns;

/// Parsed front matter of one document at one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub number: u64,
    /// Governance lifecycle stage, lower-cased.
    pub status: String,
    /// Normalized author identifiers: lower-cased `@handle` or email.
    pub authors: BTreeSet<String>,
}

/// Base and head metadata for one file path.
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub filename: String,
    pub base: DocumentMetadata,
    pub head: DocumentMetadata,
}

impl FileDiff {
    /// Bare file name, as used in user-facing messages.
    pub fn name(&self) -> &str {
        self.filename
            .rsplit('/')
            .next()
            .unwrap_or(&self.filename)
    }
}

/// Resolve the diff of `filename` between the base and head comparison sets.
///
/// The filename must appear in both sets; upstream filters keep added and
/// renamed files out, so a miss here is a defensive failure.
pub async fn resolve_diff(
    client: &GitHubClient,
    base_files: &[FileChange],
    head_files: &[FileChange],
    filename: &str,
) -> Result<FileDiff> {
    let base_file = find_file(base_files, filename)
        .ok_or_else(|| AutomergeError::MissingFile(filename.to_string()))?;
    let head_file = find_file(head_files, filename)
        .ok_or_else(|| AutomergeError::MissingFile(filename.to_string()))?;

    let (base_raw, head_raw) = tokio::try_join!(
        client.fetch_file_content(base_file),
        client.fetch_file_content(head_file)
    )?;

    let base = document_metadata(client, filename, &base_raw).await?;
    let head = document_metadata(client, filename, &head_raw).await?;

    Ok(FileDiff {
        filename: filename.to_string(),
        base,
        head,
    })
}

fn find_file<'a>(files: &'a [FileChange], filename: &str) -> Option<&'a FileChange> {
    files.iter().find(|file| file.filename == filename)
}

async fn document_metadata(
    client: &GitHubClient,
    filename: &str,
    raw: &str,
) -> Result<DocumentMetadata> {
    let front = frontmatter::parse(filename, raw)?;

    Ok(DocumentMetadata {
        number: front.eip,
        status: front.status.to_lowercase(),
        authors: resolve_authors(client, &front.author).await?,
    })
}

/// Resolve a raw author list into normalized identifiers.
///
/// `@handle` entries are lower-cased as-is. Email entries are resolved to a
/// handle via user search; when no unambiguous account is found the email
/// itself (lower-cased) stands in, with a warning.
pub async fn resolve_authors(client: &GitHubClient, raw_author: &str) -> Result<BTreeSet<String>> {
    let entries: BTreeSet<String> = patterns::author_entries(raw_author).into_iter().collect();

    let mut authors = BTreeSet::new();
    let mut lookups: JoinSet<(String, Result<Option<String>>)> = JoinSet::new();

    for entry in entries {
        if entry.starts_with('@') {
            authors.insert(entry.to_lowercase());
        } else {
            let client = client.clone();
            lookups.spawn(async move {
                let found = client.search_user_by_email(&entry).await;
                (entry, found)
            });
        }
    }

    while let Some(joined) = lookups.join_next().await {
        let (email, found) = joined?;
        match found? {
            Some(login) => {
                authors.insert(format!("@{}", login.to_lowercase()));
            }
            None => {
                warn!("no GitHub user found, using email instead: {}", email);
                authors.insert(email.to_lowercase());
            }
        }
    }

    Ok(authors)
}
