// commit-lens-core/src/lib.rs

// declare modules
pub mod ai;
pub mod error;
pub mod github;
pub mod quality;
pub mod stats;
pub mod timeline;

// re-export key structs/functions for external use by other crates
pub use clap::Parser; // re-export Parser for CLI crate
pub use console::style; // re-export for CLI crate printing
pub use dotenv::dotenv;
pub use indicatif::{ProgressBar, ProgressStyle};

pub use crate::ai::{generate_insight_report, FeedbackKind, InsightReport, XyzFeedback};
pub use crate::error::{InsightError, Result};
pub use crate::github::{fetch_commits, CommitRecord, FileChange, RunParams};
pub use crate::quality::{analyse_commit_quality, CommitQualityMetrics};
pub use crate::stats::{aggregate_commits, AggregateStats};
pub use crate::timeline::{build_timeline, TimelineEvent};

use serde::Serialize;
use std::env;
use std::time::Duration;

/// environment variable holding the generative-model credential
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
/// environment variable overriding the default model id
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";
/// optional github token used for authenticated rate limits
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

// argument parsing struct - shared by the CLI binary
#[derive(Parser, Debug, Clone)]
#[command(
    name = "commit-lens",
    about = "ai-assisted analysis of a developer's github contributions"
)]
pub struct CoreCliArgs {
    /// repository owner (user or organisation)
    #[arg(short, long)]
    pub owner: String,

    /// repository name
    #[arg(short, long)]
    pub repo: String,

    /// author login whose commits are analysed
    #[arg(short, long)]
    pub author: String,

    /// start of the date window (iso 8601, e.g. 2024-01-01T00:00:00Z)
    #[arg(long)]
    pub since: String,

    /// end of the date window (iso 8601)
    #[arg(long)]
    pub until: String,

    /// branch to analyse (defaults to the repository default branch)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// model id to use instead of the configured default
    #[arg(short, long)]
    pub model: Option<String>,

    /// print the full report as json instead of the styled summary
    #[arg(long)]
    pub json: bool,

    /// show progress details
    #[arg(short, long)]
    pub verbose: bool,
}

/// terminal output of one analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub params: RunParams,
    pub stats: AggregateStats,
    pub timeline: Vec<TimelineEvent>,
    pub insight: InsightReport,
}

/// run one full analysis: fetch the history, fold the statistics, score the
/// messages, synthesize the insight report, and assemble the result; any
/// stage failure ends the run with that stage's error, there is no partial
/// result and no retry
pub async fn execute_insight_flow(args: CoreCliArgs) -> Result<AnalysisReport> {
    dotenv().ok();

    // the model credential is a hard precondition, checked before any
    // network call is made; an empty value counts as absent
    let api_key = env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or(InsightError::MissingCredential)?;
    let model = args
        .model
        .clone()
        .or_else(|| env::var(MODEL_ENV).ok())
        .unwrap_or_else(|| ai::DEFAULT_MODEL.to_string());
    let github_token = env::var(GITHUB_TOKEN_ENV).ok();

    let params = RunParams {
        owner: args.owner,
        repo: args.repo,
        author: args.author,
        since: args.since,
        until: args.until,
        branch: args.branch,
    };
    params.validate()?;

    let client = github::build_client()?;

    let spinner = progress_spinner("fetching commit history...");
    let commits = fetch_commits(&client, github_token.as_deref(), &params).await;
    spinner.finish_and_clear();
    let commits = commits?;

    if args.verbose {
        println!(
            "fetched {} commits for {}",
            commits.len(),
            style(&params.author).cyan()
        );
    }

    // synchronous transformations, no i/o
    let stats = aggregate_commits(&commits);
    let quality = analyse_commit_quality(&commits);
    let timeline = build_timeline(&commits);

    let spinner = progress_spinner(&format!("generating insight report with {model}..."));
    let insight =
        generate_insight_report(&api_key, &model, &stats, &commits, quality, &params).await;
    spinner.finish_and_clear();
    let insight = insight?;

    Ok(AnalysisReport {
        params,
        stats,
        timeline,
        insight,
    })
}

fn progress_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
