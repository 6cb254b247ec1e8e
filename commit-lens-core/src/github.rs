// github commit source - paginated history fetch over the rest api

use crate::error::{InsightError, Result};
use chrono::{DateTime, FixedOffset};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_ROOT: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

/// cap on concurrent per-commit detail requests within one page; the listing
/// order is preserved so downstream folds stay reproducible
const DETAIL_FETCH_CONCURRENCY: usize = 8;

/// parameters for one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct RunParams {
    pub owner: String,
    pub repo: String,
    pub author: String,
    pub since: String,
    pub until: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl RunParams {
    /// all five of owner/repo/author/since/until must be present
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(InsightError::MissingParameter("owner"));
        }
        if self.repo.trim().is_empty() {
            return Err(InsightError::MissingParameter("repo"));
        }
        if self.author.trim().is_empty() {
            return Err(InsightError::MissingParameter("author"));
        }
        if self.since.trim().is_empty() {
            return Err(InsightError::MissingParameter("since"));
        }
        if self.until.trim().is_empty() {
            return Err(InsightError::MissingParameter("until"));
        }
        Ok(())
    }
}

/// one historical commit, in the shape the github api returns it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub commit: CommitMeta,
    #[serde(default)]
    pub stats: Option<CommitTotals>,
    #[serde(default)]
    pub files: Option<Vec<FileChange>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMeta {
    pub author: CommitAuthor,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitTotals {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

/// one file touched by a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

/// the listing endpoint only needs to yield shas; details come per commit
#[derive(Debug, Deserialize)]
struct ListedCommit {
    sha: String,
}

/// build the http client used for all github calls in one run
pub fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent("commit-lens")
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// fetch the full commit history for the run window: one page-listing call
/// followed by one detail call per commit, capped per page
pub async fn fetch_commits(
    client: &reqwest::Client,
    token: Option<&str>,
    params: &RunParams,
) -> Result<Vec<CommitRecord>> {
    params.validate()?;

    let mut commits = Vec::new();
    let mut page = 1u32;

    loop {
        let listed = list_commit_page(client, token, params, page).await?;
        let page_len = listed.len();
        if page_len == 0 {
            break;
        }

        // detail calls within a page go through a bounded, order-preserving
        // pipeline rather than an unconditional parallel fan-out
        let detailed: Vec<CommitRecord> = stream::iter(
            listed
                .into_iter()
                .map(|item| fetch_commit_detail(client, token, params, item.sha)),
        )
        .buffered(DETAIL_FETCH_CONCURRENCY)
        .try_collect()
        .await?;

        commits.extend(detailed);

        if page_len < PER_PAGE {
            break;
        }
        page += 1;
    }

    Ok(commits)
}

async fn list_commit_page(
    client: &reqwest::Client,
    token: Option<&str>,
    params: &RunParams,
    page: u32,
) -> Result<Vec<ListedCommit>> {
    let url = format!("{API_ROOT}/repos/{}/{}/commits", params.owner, params.repo);
    let per_page = PER_PAGE.to_string();
    let page = page.to_string();

    let mut query: Vec<(&str, &str)> = vec![
        ("author", params.author.as_str()),
        ("since", params.since.as_str()),
        ("until", params.until.as_str()),
        ("per_page", per_page.as_str()),
        ("page", page.as_str()),
    ];
    if let Some(branch) = params.branch.as_deref() {
        query.push(("sha", branch));
    }

    let response = with_auth(client.get(&url), token).query(&query).send().await?;
    read_json(response).await
}

async fn fetch_commit_detail(
    client: &reqwest::Client,
    token: Option<&str>,
    params: &RunParams,
    sha: String,
) -> Result<CommitRecord> {
    let url = format!(
        "{API_ROOT}/repos/{}/{}/commits/{sha}",
        params.owner, params.repo
    );
    let response = with_auth(client.get(&url), token).send().await?;
    read_json(response).await
}

fn with_auth(request: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", format!("Bearer {token}")),
        None => request,
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(InsightError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<T>().await?)
}
