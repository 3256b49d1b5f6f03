// SPDX-License-Identifier: PMPL-1.0-or-later

//! Squash-merge action with the fixed automerge commit text

use tracing::info;

use crate::config::PullRequestContext;
use crate::diff::FileDiff;
use crate::error::Result;
use crate::github::{GitHubClient, PullRequest};

/// Fixed commit message body explaining the automated merge.
pub const MERGE_MESSAGE: &str = "\
Hi, I'm a bot! This change was automatically merged because:

- It only modifies existing Draft, Review, or Last Call EIP(s)
- The PR was approved or written by at least one author of each modified EIP
- The build is passing
";

/// Commit title enumerating the affected document numbers in processing order.
pub fn commit_title(eip_numbers: &[u64], pr_number: u64) -> String {
    let ids = eip_numbers
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Automatically merged updates to draft EIP(s) {} (#{})",
        ids, pr_number
    )
}

/// Squash-merge the PR at its head sha.
pub async fn merge_pull_request(
    client: &GitHubClient,
    ctx: &PullRequestContext,
    pr: &PullRequest,
    diffs: &[FileDiff],
) -> Result<()> {
    let numbers: Vec<u64> = diffs.iter().map(|diff| diff.head.number).collect();
    let title = commit_title(&numbers, pr.number);

    // Merge into the base repository; for forked PRs that differs from the
    // repository the event fired on.
    let (owner, repo) = match pr.base.repo {
        Some(ref repo) => (repo.owner.login.as_str(), repo.name.as_str()),
        None => (ctx.owner.as_str(), ctx.repo.as_str()),
    };

    info!("merging PR {} as \"{}\"", pr.number, title);
    client
        .merge_pull_request(owner, repo, pr.number, &pr.head.sha, &title, MERGE_MESSAGE)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_title_single_document() {
        assert_eq!(
            commit_title(&[1234], 6),
            "Automatically merged updates to draft EIP(s) 1234 (#6)"
        );
    }

    #[test]
    fn test_commit_title_preserves_processing_order() {
        assert_eq!(
            commit_title(&[20, 7, 1559], 42),
            "Automatically merged updates to draft EIP(s) 20, 7, 1559 (#42)"
        );
    }
}
