// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-document approval checks
//!
//! Approval is per document, not per PR: a PR touching three documents needs
//! at least one author's approval for each of them independently, since the
//! author sets are disjoint in general.

use std::collections::BTreeSet;

use crate::config::PullRequestContext;
use crate::diff::FileDiff;
use crate::error::{ErrorLog, Result};
use crate::github::{GitHubClient, PullRequest};

/// Review state counted as an approval.
const REVIEW_APPROVED: &str = "APPROVED";

/// A document still waiting for an author's approval, with the handles that
/// can be asked to review.
#[derive(Debug, Clone)]
pub struct PendingApproval {
    pub filename: String,
    pub reviewers: Vec<String>,
}

/// Everyone considered to have approved the PR: its own author plus every
/// reviewer whose review state is approved, normalized as `@login`.
pub async fn approval_set(
    client: &GitHubClient,
    ctx: &PullRequestContext,
    pr: &PullRequest,
) -> Result<BTreeSet<String>> {
    let mut approvals = BTreeSet::new();

    if let Some(ref user) = pr.user {
        approvals.insert(format!("@{}", user.login.to_lowercase()));
    }

    for review in client
        .list_reviews(&ctx.owner, &ctx.repo, ctx.pr_number)
        .await?
    {
        if review.state == REVIEW_APPROVED {
            if let Some(user) = review.user {
                approvals.insert(format!("@{}", user.login.to_lowercase()));
            }
        }
    }

    Ok(approvals)
}

/// Drop a diff from the pending list if one of its base-commit authors has
/// approved; otherwise record the deficiency and return the authors whose
/// review should be requested.
pub fn remove_approved(
    diff: &FileDiff,
    approvals: &BTreeSet<String>,
    errors: &mut ErrorLog,
) -> Option<PendingApproval> {
    let authors = &diff.base.authors;

    if authors.is_empty() {
        errors.push(format!(
            "EIP {} has no identifiable authors who can approve PRs",
            diff.head.number
        ));
        return None;
    }

    if authors.iter().any(|author| approvals.contains(author)) {
        return None;
    }

    let logins: Vec<&str> = authors.iter().map(|author| bare_login(author)).collect();
    errors.push(format!(
        "{} requires approval from one of ({})",
        diff.name(),
        logins.join(", ")
    ));

    // Only handles can be asked to review; an unresolved email cannot.
    let reviewers = authors
        .iter()
        .filter(|author| author.starts_with('@'))
        .map(|author| bare_login(author).to_string())
        .collect();

    Some(PendingApproval {
        filename: diff.filename.clone(),
        reviewers,
    })
}

fn bare_login(author: &str) -> &str {
    author.strip_prefix('@').unwrap_or(author)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DocumentMetadata;

    fn diff_with_authors(authors: &[&str]) -> FileDiff {
        let metadata = DocumentMetadata {
            number: 1234,
            status: "draft".to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
        };
        FileDiff {
            filename: "EIPS/eip-1234.md".to_string(),
            base: metadata.clone(),
            head: metadata,
        }
    }

    fn set(entries: &[&str]) -> BTreeSet<String> {
        entries.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_approved_author_removes_diff() {
        let mut errors = ErrorLog::new();
        let pending = remove_approved(
            &diff_with_authors(&["@carol"]),
            &set(&["@dave", "@carol"]),
            &mut errors,
        );

        assert!(pending.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_approval_recorded_with_bare_logins() {
        let mut errors = ErrorLog::new();
        let pending = remove_approved(
            &diff_with_authors(&["@carol"]),
            &set(&["@dave"]),
            &mut errors,
        );

        let pending = pending.expect("diff should stay pending");
        assert_eq!(pending.reviewers, vec!["carol"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.entries()[0],
            "eip-1234.md requires approval from one of (carol)"
        );
    }

    #[test]
    fn test_error_lists_every_unapproved_author() {
        let mut errors = ErrorLog::new();
        remove_approved(
            &diff_with_authors(&["@carol", "bob@example.com"]),
            &set(&["@dave"]),
            &mut errors,
        );

        let message = &errors.entries()[0];
        assert!(message.contains("carol"));
        assert!(message.contains("bob@example.com"));
        assert!(!message.contains("dave"));
    }

    #[test]
    fn test_email_authors_not_requested_as_reviewers() {
        let mut errors = ErrorLog::new();
        let pending = remove_approved(
            &diff_with_authors(&["@carol", "bob@example.com"]),
            &set(&["@dave"]),
            &mut errors,
        )
        .expect("diff should stay pending");

        assert_eq!(pending.reviewers, vec!["carol"]);
    }

    #[test]
    fn test_no_identifiable_authors_recorded() {
        let mut errors = ErrorLog::new();
        let pending = remove_approved(&diff_with_authors(&[]), &set(&["@dave"]), &mut errors);

        assert!(pending.is_none());
        assert_eq!(errors.len(), 1);
        assert!(errors.entries()[0]
            .contains("EIP 1234 has no identifiable authors who can approve PRs"));
    }
}
