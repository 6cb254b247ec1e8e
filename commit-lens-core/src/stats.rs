// commit aggregation engine - folds raw commit history into summary statistics

use crate::github::CommitRecord;
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// vocabulary scanned for in lower-cased commit messages; a message may hit
/// several entries
const MESSAGE_KEYWORDS: &[&str] = &[
    "fix",
    "feat",
    "feature",
    "add",
    "update",
    "refactor",
    "remove",
    "delete",
    "improve",
    "optimize",
    "bug",
    "test",
    "docs",
    "style",
    "chore",
    "merge",
    "release",
    "hotfix",
    "breaking",
    "deprecated",
];

/// the single largest commit by total churn; zero-value placeholder until a
/// commit with a stats block is seen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LargestCommit {
    pub sha: String,
    pub message: String,
    pub changes: u64,
}

/// accumulated activity for one file path across the commit set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileActivity {
    pub modifications: u64,
    pub additions: u64,
    pub deletions: u64,
    pub language: String,
}

/// canonical statistical summary of a commit set; built once per run,
/// read-only afterwards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_commits: u64,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub net_changes: i64,
    pub files_modified: u64,
    pub unique_files: BTreeSet<String>,
    pub file_changes: BTreeMap<String, FileActivity>,
    pub language_distribution: BTreeMap<String, u64>,
    pub commits_by_day: BTreeMap<String, u64>,
    pub commits_by_hour: BTreeMap<u32, u64>,
    pub commits_by_weekday: BTreeMap<String, u64>,
    pub average_commit_size: f64,
    pub largest_commit: LargestCommit,
    pub commit_keywords: BTreeMap<String, u64>,
}

/// fold an ordered commit sequence into one aggregate summary; pure function
/// of its input, no network, inputs unmutated
pub fn aggregate_commits(commits: &[CommitRecord]) -> AggregateStats {
    let mut stats = AggregateStats {
        total_commits: commits.len() as u64,
        ..AggregateStats::default()
    };

    for record in commits {
        if let Some(totals) = &record.stats {
            stats.total_additions += totals.additions;
            stats.total_deletions += totals.deletions;

            // strict greater-than keeps the first-seen commit on ties
            if totals.total > stats.largest_commit.changes {
                stats.largest_commit = LargestCommit {
                    sha: record.sha.clone(),
                    message: record.commit.message.clone(),
                    changes: totals.total,
                };
            }
        }

        if let Some(files) = &record.files {
            for file in files {
                stats.unique_files.insert(file.filename.clone());

                let language = language_for_path(&file.filename);
                let entry = stats
                    .file_changes
                    .entry(file.filename.clone())
                    .or_insert_with(|| FileActivity {
                        modifications: 0,
                        additions: 0,
                        deletions: 0,
                        language: language.to_string(),
                    });
                entry.modifications += 1;
                entry.additions += file.additions;
                entry.deletions += file.deletions;

                *stats
                    .language_distribution
                    .entry(language.to_string())
                    .or_insert(0) += file.changes;
            }
        }

        // time buckets use the commit author's timestamp as given, so the
        // local day and hour follow the author's offset
        let date = &record.commit.author.date;
        *stats
            .commits_by_day
            .entry(date.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
        *stats.commits_by_hour.entry(date.hour()).or_insert(0) += 1;
        *stats
            .commits_by_weekday
            .entry(date.format("%A").to_string())
            .or_insert(0) += 1;

        for keyword in extract_keywords(&record.commit.message) {
            *stats.commit_keywords.entry(keyword.to_string()).or_insert(0) += 1;
        }
    }

    stats.files_modified = stats.unique_files.len() as u64;
    stats.net_changes = stats.total_additions as i64 - stats.total_deletions as i64;
    stats.average_commit_size = if commits.is_empty() {
        0.0
    } else {
        (stats.total_additions + stats.total_deletions) as f64 / commits.len() as f64
    };

    stats
}

/// map a file path to a language via its extension, case-insensitively;
/// paths without a dot or with an unrecognized extension fall back to "Other"
pub fn language_for_path(filename: &str) -> &'static str {
    let extension = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return "Other",
    };

    match extension.as_str() {
        "js" | "jsx" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "py" => "Python",
        "java" => "Java",
        "cpp" | "cc" | "cxx" => "C++",
        "c" | "h" => "C",
        "cs" => "C#",
        "go" => "Go",
        "rs" => "Rust",
        "rb" => "Ruby",
        "php" => "PHP",
        "swift" => "Swift",
        "kt" | "kts" => "Kotlin",
        "html" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "json" => "JSON",
        "md" => "Markdown",
        "sql" => "SQL",
        "sh" => "Shell",
        "yml" | "yaml" => "YAML",
        "xml" => "XML",
        _ => "Other",
    }
}

/// scan a message for known keywords
pub fn extract_keywords(message: &str) -> Vec<&'static str> {
    let message = message.to_lowercase();
    MESSAGE_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| message.contains(*keyword))
        .collect()
}
