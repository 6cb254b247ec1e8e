// commit message quality heuristics - derived from messages only,
// independent of diff content

use crate::github::CommitRecord;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // conventional commits header: type(scope)?: description
    static ref CONVENTIONAL_PATTERN: Regex = Regex::new(
        r"(?i)^(feat|fix|docs|style|refactor|perf|test|chore|ci|build|revert)(\(.+\))?:\s.+"
    )
    .unwrap();
}

/// message-hygiene metrics; the numeric fields are computed locally, the
/// suggestions are filled in later from the model response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitQualityMetrics {
    pub average_message_length: u64,
    pub conventional_usage_percent: u64,
    pub descriptive_score: u64,
    pub suggestions: Vec<String>,
}

/// derive message-quality metrics from the commit sequence; an empty set
/// yields all zeros
pub fn analyse_commit_quality(commits: &[CommitRecord]) -> CommitQualityMetrics {
    if commits.is_empty() {
        return CommitQualityMetrics::default();
    }

    let total = commits.len() as f64;
    let total_length: usize = commits.iter().map(|c| c.commit.message.len()).sum();
    let conventional_count = commits
        .iter()
        .filter(|c| CONVENTIONAL_PATTERN.is_match(&c.commit.message))
        .count() as f64;

    let average_length = total_length as f64 / total;
    let conventional_ratio = conventional_count / total;
    let descriptive_score = (average_length * 1.5 + conventional_ratio * 20.0).min(100.0);

    CommitQualityMetrics {
        average_message_length: average_length.round() as u64,
        conventional_usage_percent: (conventional_ratio * 100.0).round() as u64,
        descriptive_score: descriptive_score.round() as u64,
        suggestions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{CommitAuthor, CommitMeta};
    use chrono::DateTime;

    fn with_messages(messages: &[&str]) -> Vec<CommitRecord> {
        messages
            .iter()
            .map(|message| CommitRecord {
                sha: "abc1234".to_string(),
                commit: CommitMeta {
                    author: CommitAuthor {
                        name: "dev".to_string(),
                        email: "dev@example.com".to_string(),
                        date: DateTime::parse_from_rfc3339("2024-03-04T10:00:00Z").unwrap(),
                    },
                    message: message.to_string(),
                },
                stats: None,
                files: None,
            })
            .collect()
    }

    #[test]
    fn empty_commit_set_yields_all_zeros() {
        let metrics = analyse_commit_quality(&[]);
        assert_eq!(metrics.average_message_length, 0);
        assert_eq!(metrics.conventional_usage_percent, 0);
        assert_eq!(metrics.descriptive_score, 0);
        assert!(metrics.suggestions.is_empty());
    }

    #[test]
    fn fully_conventional_set_scores_one_hundred_percent() {
        let commits = with_messages(&["feat(auth): add login"]);
        let metrics = analyse_commit_quality(&commits);

        assert_eq!(metrics.conventional_usage_percent, 100);
        // "feat(auth): add login" is 21 chars: 21 * 1.5 + 20 = 51.5
        assert_eq!(metrics.average_message_length, 21);
        assert_eq!(metrics.descriptive_score, 52);
    }

    #[test]
    fn prefix_matching_is_case_insensitive_and_scope_optional() {
        let commits = with_messages(&["FIX: handle empty input", "refactor: split parser"]);
        let metrics = analyse_commit_quality(&commits);
        assert_eq!(metrics.conventional_usage_percent, 100);
    }

    #[test]
    fn unknown_prefixes_do_not_count_as_conventional() {
        let commits = with_messages(&["feature: not a valid type tag here really"]);
        let metrics = analyse_commit_quality(&commits);
        assert_eq!(metrics.conventional_usage_percent, 0);
    }

    #[test]
    fn all_empty_messages_score_zero() {
        let commits = with_messages(&["", "", ""]);
        let metrics = analyse_commit_quality(&commits);
        assert_eq!(metrics.descriptive_score, 0);
        assert_eq!(metrics.average_message_length, 0);
    }

    #[test]
    fn descriptive_score_is_capped_at_one_hundred() {
        let long = "feat(core): implement the full aggregation pipeline with language \
                    histograms, calendar bucketing and keyword extraction";
        let commits = with_messages(&[long]);
        let metrics = analyse_commit_quality(&commits);
        assert_eq!(metrics.descriptive_score, 100);
    }
}
