// SPDX-License-Identifier: PMPL-1.0-or-later

//! Decision orchestrator
//!
//! Sequences one full evaluation of a pull request: context validation,
//! comparison, per-file diff resolution, eligibility and approval checks,
//! then the terminal action (merge, reviewer request, or comment). All
//! user-facing problems accumulate in an [`ErrorLog`]; only context and
//! transport failures unwind to the top-level handler here.

use std::future::Future;

use tracing::{error, info, warn};

use crate::approval::{self, PendingApproval};
use crate::comment;
use crate::config::{Config, PullRequestContext};
use crate::diff::{self, FileDiff};
use crate::eligibility;
use crate::error::{AutomergeError, ErrorLog, Result};
use crate::github::{FileChange, GitHubClient};
use crate::merge;

/// Prefix of the error-log entry recording a bot malfunction.
pub const EXCEPTION_PREFIX: &str = "An Exception Occurred While Linting: ";

/// Terminal outcome of a successful bot run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// All checks passed; the PR was (or would be) squash-merged.
    Merged { eip_numbers: Vec<u64> },
    /// The PR touches no eligible documents; nothing to merge, no errors.
    NothingToDo,
    /// Checks recorded errors; the summary comment was (or would be) posted.
    Blocked,
}

/// Outcome of a run, including whether the bot itself malfunctioned.
///
/// `failed` is only true for bot exceptions; a PR that legitimately fails
/// eligibility is a successful run that chose not to merge.
#[derive(Debug)]
pub struct RunReport {
    pub decision: Option<Decision>,
    pub errors: Vec<String>,
    pub failed: bool,
}

/// Execute one full run, catching any escaped error at the top level.
pub async fn run(config: &Config, ctx: &PullRequestContext, dry_run: bool) -> RunReport {
    let client = GitHubClient::new(config);
    let mut errors = ErrorLog::new();

    match pipeline(&client, ctx, dry_run, &mut errors).await {
        Ok(decision) => RunReport {
            decision: Some(decision),
            errors: errors.into_entries(),
            failed: false,
        },
        Err(err) => {
            error!("run failed: {}", err);
            errors.push(format!("{}{}", EXCEPTION_PREFIX, err));
            if !dry_run {
                // The PR should not be left silent, but a comment failure
                // must not cascade into further failure handling.
                best_effort(
                    "posting failure comment",
                    comment::post_comment(&client, ctx, &errors),
                )
                .await;
            }
            RunReport {
                decision: None,
                errors: errors.into_entries(),
                failed: true,
            }
        }
    }
}

async fn pipeline(
    client: &GitHubClient,
    ctx: &PullRequestContext,
    dry_run: bool,
    errors: &mut ErrorLog,
) -> Result<Decision> {
    let pr = client
        .get_pull_request(&ctx.owner, &ctx.repo, ctx.pr_number)
        .await?;

    if pr.merged {
        return Err(AutomergeError::Context(format!(
            "PR {} is already merged; quitting",
            ctx.pr_number
        )));
    }
    match pr.mergeable_state.as_deref() {
        Some("clean") => {}
        other => {
            return Err(AutomergeError::Context(format!(
                "PR {} mergeable state is {}; quitting",
                ctx.pr_number,
                other.unwrap_or("unknown")
            )));
        }
    }

    let comparison = client
        .compare_commits(&ctx.owner, &ctx.repo, &ctx.base_sha, &ctx.head_sha)
        .await?;

    // Pure filters first, so ineligible files cost no further API calls.
    let candidates: Vec<FileChange> = comparison
        .files
        .into_iter()
        .filter(eligibility::is_file_preexisting)
        .filter(eligibility::is_valid_eip_filename)
        .collect();

    info!(
        "PR {} has {} eligible EIP file(s)",
        ctx.pr_number,
        candidates.len()
    );

    if candidates.is_empty() {
        info!("no eligible documents to evaluate; not merging");
        return Ok(Decision::NothingToDo);
    }

    let (base_commit, head_commit) = tokio::try_join!(
        client.get_commit(&ctx.owner, &ctx.repo, &ctx.base_sha),
        client.get_commit(&ctx.owner, &ctx.repo, &ctx.head_sha)
    )?;

    let mut diffs: Vec<FileDiff> = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        match diff::resolve_diff(
            client,
            &base_commit.files,
            &head_commit.files,
            &candidate.filename,
        )
        .await
        {
            Ok(diff) => diffs.push(diff),
            // A renamed or added file slipping past the filters is recorded,
            // not fatal; remaining files still get checked.
            Err(err @ AutomergeError::MissingFile(_)) => errors.push(err.to_string()),
            Err(err) => return Err(err),
        }
    }

    for diff in &diffs {
        eligibility::check_document(diff, errors);
    }

    let approvals = approval::approval_set(client, ctx, &pr).await?;
    let pending: Vec<PendingApproval> = diffs
        .iter()
        .filter_map(|diff| approval::remove_approved(diff, &approvals, errors))
        .collect();

    // When missing approvals are the only problems, ask the authors for
    // review so the PR can become mergeable without human triage.
    if !pending.is_empty() && errors.len() == pending.len() && !dry_run {
        for item in &pending {
            if item.reviewers.is_empty() {
                continue;
            }
            best_effort(
                "requesting reviewers",
                client.request_reviewers(&ctx.owner, &ctx.repo, ctx.pr_number, &item.reviewers),
            )
            .await;
        }
    }

    if errors.is_empty() {
        let eip_numbers: Vec<u64> = diffs.iter().map(|diff| diff.head.number).collect();
        if !dry_run {
            merge::merge_pull_request(client, ctx, &pr, &diffs).await?;
        }
        return Ok(Decision::Merged { eip_numbers });
    }

    if !dry_run {
        comment::post_comment(client, ctx, errors).await?;
    }
    Ok(Decision::Blocked)
}

/// Await a side-effecting call whose failure must not propagate; the
/// failure is logged and swallowed.
async fn best_effort<F>(what: &str, fut: F)
where
    F: Future<Output = Result<()>>,
{
    if let Err(err) = fut.await {
        warn!("{} failed: {}", what, err);
    }
}
