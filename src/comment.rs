// SPDX-License-Identifier: PMPL-1.0-or-later

//! Idempotent bot comment on the PR thread
//!
//! Repeated CI runs on the same PR must never stack up comments: the bot
//! finds its own prior comment, updates it only when the rendered message
//! changed, and creates one only when none exists.

use tracing::debug;

use crate::config::PullRequestContext;
use crate::error::{ErrorLog, Result};
use crate::github::GitHubClient;

/// Fixed header of every bot comment.
pub const COMMENT_HEADER: &str =
    "Hi! I'm a bot, and I wanted to automerge your PR, but couldn't because of the following issue(s):";

/// Header plus one bullet per accumulated error.
pub fn render_comment(errors: &[String]) -> String {
    let mut message = String::from(COMMENT_HEADER);
    message.push_str("\n\n");
    for error in errors {
        message.push_str("- ");
        message.push_str(error);
        message.push('\n');
    }
    message
}

/// Create or update the bot's single summary comment on the PR.
pub async fn post_comment(
    client: &GitHubClient,
    ctx: &PullRequestContext,
    errors: &ErrorLog,
) -> Result<()> {
    let message = render_comment(errors.entries());

    let me = client.get_authenticated_user().await?;
    let comments = client
        .list_issue_comments(&ctx.owner, &ctx.repo, ctx.pr_number)
        .await?;

    for comment in comments {
        let author = comment.user.as_ref().map(|user| user.login.as_str());
        if author == Some(me.as_str()) {
            if comment.body.as_deref() != Some(message.as_str()) {
                client
                    .update_comment(&ctx.owner, &ctx.repo, comment.id, &message)
                    .await?;
            } else {
                debug!("existing comment already matches; nothing to update");
            }
            return Ok(());
        }
    }

    client
        .create_comment(&ctx.owner, &ctx.repo, ctx.pr_number, &message)
        .await
}
