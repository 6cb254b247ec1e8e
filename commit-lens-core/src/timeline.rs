// timeline builder - day-grouped view of the commit history for display

use crate::github::CommitRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineCommit {
    pub sha: String,
    pub message: String,
    pub additions: u64,
    pub deletions: u64,
    pub files: u64,
}

/// commits grouped by calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String,
    pub commits: Vec<TimelineCommit>,
}

/// group commits by author-local calendar day, newest day first; commits
/// within a day keep their received order
pub fn build_timeline(commits: &[CommitRecord]) -> Vec<TimelineEvent> {
    let mut by_day: BTreeMap<String, Vec<TimelineCommit>> = BTreeMap::new();

    for record in commits {
        let day = record.commit.author.date.format("%Y-%m-%d").to_string();
        by_day.entry(day).or_default().push(TimelineCommit {
            sha: record.sha.chars().take(7).collect(),
            message: record
                .commit
                .message
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
            additions: record.stats.as_ref().map_or(0, |s| s.additions),
            deletions: record.stats.as_ref().map_or(0, |s| s.deletions),
            files: record.files.as_ref().map_or(0, |f| f.len() as u64),
        });
    }

    by_day
        .into_iter()
        .rev()
        .map(|(date, commits)| TimelineEvent { date, commits })
        .collect()
}
