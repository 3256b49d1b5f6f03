// SPDX-License-Identifier: PMPL-1.0-or-later

//! automergebot CLI entry point

use std::process::ExitCode;

use automergebot::config::{Config, ContextOverrides, PullRequestContext};
use automergebot::run::{self, Decision};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// automergebot: auto-merge eligible EIP pull requests
#[derive(Parser)]
#[command(name = "automergebot")]
#[command(about = "CI bot that auto-merges eligible EIP pull requests")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// GitHub API base URL override
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the triggering PR and merge it or comment on it
    Run,

    /// Evaluate a PR without performing any side effects
    Check {
        /// Repository owner (defaults to REPO_OWNER_NAME)
        #[arg(long)]
        owner: Option<String>,

        /// Repository name (defaults to REPO_NAME)
        #[arg(long)]
        repo: Option<String>,

        /// Pull request number (defaults to PULL_NUMBER)
        #[arg(long)]
        pr: Option<u64>,

        /// Base commit sha (defaults to BASE_SHA)
        #[arg(long)]
        base_sha: Option<String>,

        /// Head commit sha (defaults to HEAD_SHA)
        #[arg(long)]
        head_sha: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.github_api_url = url;
    }

    let (ctx, dry_run) = match cli.command {
        Commands::Run => match PullRequestContext::from_env() {
            Ok(ctx) => (ctx, false),
            Err(err) => {
                eprintln!("Error resolving run context: {}", err);
                return ExitCode::FAILURE;
            }
        },
        Commands::Check {
            owner,
            repo,
            pr,
            base_sha,
            head_sha,
        } => {
            let overrides = ContextOverrides {
                owner,
                repo,
                pr_number: pr,
                base_sha,
                head_sha,
            };
            match PullRequestContext::resolve(overrides) {
                Ok(ctx) => (ctx, true),
                Err(err) => {
                    eprintln!("Error resolving run context: {}", err);
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    let report = run::run(&config, &ctx, dry_run).await;

    if dry_run {
        print_report(&ctx, &report);
    }

    if report.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(filter))
        .init();
}

fn print_report(ctx: &PullRequestContext, report: &run::RunReport) {
    match &report.decision {
        Some(Decision::Merged { eip_numbers }) => {
            println!(
                "PR {} would be merged as \"{}\"",
                ctx.pr_number,
                automergebot::merge::commit_title(eip_numbers, ctx.pr_number)
            );
        }
        Some(Decision::NothingToDo) => {
            println!("PR {} touches no eligible EIP files; nothing to do", ctx.pr_number);
        }
        Some(Decision::Blocked) => {
            println!("PR {} would not be merged:", ctx.pr_number);
            for error in &report.errors {
                println!("  - {}", error);
            }
        }
        None => {
            println!("Evaluation of PR {} failed:", ctx.pr_number);
            for error in &report.errors {
                println!("  - {}", error);
            }
        }
    }
}
