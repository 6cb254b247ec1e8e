// response normalization module - turns raw model text into a strict,
// always-populated report

use crate::error::{InsightError, Result};
use crate::quality::CommitQualityMetrics;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_PRODUCTIVITY_SCORE: f64 = 100.0;

/// category tag of one feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Positive,
    Improvement,
    Neutral,
}

impl FeedbackKind {
    /// parse a model-supplied tag; anything unrecognized is neutral
    fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "positive" => FeedbackKind::Positive,
            "improvement" => FeedbackKind::Improvement,
            _ => FeedbackKind::Neutral,
        }
    }
}

/// one structured feedback item: observed context, specific action, resulting
/// effect; always fully populated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XyzFeedback {
    pub situation: String,
    pub behavior: String,
    pub impact: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
}

/// final synthesized report; every field is present and typed even when the
/// upstream payload provides only a subset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub executive_summary: String,
    pub xyz_feedback: Vec<XyzFeedback>,
    pub recommendations: Vec<String>,
    pub productivity_score: u64,
    pub strengths: Vec<String>,
    pub areas_of_improvement: Vec<String>,
    pub commit_quality: CommitQualityMetrics,
    pub implemented_features: Vec<String>,
}

/// strip a leading code fence (with or without a language tag) and a trailing
/// fence; unfenced text passes through unchanged, so stripping is idempotent
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // the fence line may carry a language tag; content starts after it
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// parse the model's raw text into a fully populated report, merging in the
/// locally computed quality metrics; only genuinely unparseable content is an
/// error, absent fields get safe defaults
pub fn parse_insight_response(
    raw: &str,
    mut quality: CommitQualityMetrics,
) -> Result<InsightReport> {
    let payload = strip_code_fences(raw);
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| InsightError::MalformedResponse(e.to_string()))?;
    if !value.is_object() {
        return Err(InsightError::MalformedResponse(
            "expected a json object at the top level".to_string(),
        ));
    }

    // the model supplies only the textual suggestions; the numeric quality
    // metrics are computed locally and never overwritten
    quality.suggestions = string_list(&value, "commitQualitySuggestions");

    Ok(InsightReport {
        executive_summary: string_field(&value, "executiveSummary"),
        xyz_feedback: feedback_list(&value),
        recommendations: string_list(&value, "recommendations"),
        productivity_score: score_field(&value, "productivityScore"),
        strengths: string_list(&value, "strengths"),
        areas_of_improvement: string_list(&value, "areasOfImprovement"),
        commit_quality: quality,
        implemented_features: string_list(&value, "implementedFeatures"),
    })
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// model-reported scores are clamped to [0, 100] at this boundary rather
/// than passed through out of range
fn score_field(value: &Value, key: &str) -> u64 {
    let score = value.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    score.clamp(0.0, MAX_PRODUCTIVITY_SCORE).round() as u64
}

fn feedback_list(value: &Value) -> Vec<XyzFeedback> {
    value
        .get("xyzFeedback")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| XyzFeedback {
                    situation: string_field(item, "situation"),
                    behavior: string_field(item, "behavior"),
                    impact: string_field(item, "impact"),
                    kind: FeedbackKind::from_tag(
                        item.get("type").and_then(Value::as_str).unwrap_or(""),
                    ),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quality() -> CommitQualityMetrics {
        CommitQualityMetrics {
            average_message_length: 42,
            conventional_usage_percent: 80,
            descriptive_score: 75,
            suggestions: Vec::new(),
        }
    }

    #[test]
    fn fence_stripping_handles_tagged_and_untagged_fences() {
        let tagged = "```json\n{\"a\": 1}\n```";
        let untagged = "```\n{\"a\": 1}\n```";

        assert_eq!(strip_code_fences(tagged), "{\"a\": 1}");
        assert_eq!(strip_code_fences(untagged), "{\"a\": 1}");
    }

    #[test]
    fn fence_stripping_is_idempotent() {
        let fenced = "```json\n{\"a\": 1}\n```";
        let once = strip_code_fences(fenced);
        let twice = strip_code_fences(once);

        assert_eq!(once, twice);
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn full_payload_round_trips_into_the_report() {
        let raw = r#"```json
        {
            "executiveSummary": "built the ingestion layer",
            "xyzFeedback": [
                {
                    "situation": "the api had no pagination",
                    "behavior": "added a page loop with bounded detail fetches",
                    "impact": "large histories no longer time out",
                    "type": "positive"
                }
            ],
            "recommendations": ["add integration tests"],
            "productivityScore": 87,
            "strengths": ["clear module boundaries"],
            "areasOfImprovement": ["error messages"],
            "commitQualitySuggestions": ["use conventional prefixes"],
            "implementedFeatures": ["paginated ingestion"]
        }
        ```"#;

        let report = parse_insight_response(raw, quality()).unwrap();

        assert_eq!(report.executive_summary, "built the ingestion layer");
        assert_eq!(report.xyz_feedback.len(), 1);
        assert_eq!(report.xyz_feedback[0].kind, FeedbackKind::Positive);
        assert_eq!(report.productivity_score, 87);
        assert_eq!(report.commit_quality.suggestions, vec!["use conventional prefixes"]);
        // numeric metrics stay locally computed
        assert_eq!(report.commit_quality.descriptive_score, 75);
        assert_eq!(report.implemented_features, vec!["paginated ingestion"]);
    }

    #[test]
    fn subset_payload_defaults_every_missing_field() {
        let raw = r#"{"executiveSummary": "only a summary"}"#;
        let report = parse_insight_response(raw, quality()).unwrap();

        assert_eq!(report.executive_summary, "only a summary");
        assert!(report.xyz_feedback.is_empty());
        assert!(report.recommendations.is_empty());
        assert_eq!(report.productivity_score, 0);
        assert!(report.strengths.is_empty());
        assert!(report.areas_of_improvement.is_empty());
        assert!(report.implemented_features.is_empty());
        assert!(report.commit_quality.suggestions.is_empty());
    }

    #[test]
    fn out_of_range_scores_are_clamped_not_rejected() {
        let raw = "```json\n{\"productivityScore\": 150}\n```";
        let report = parse_insight_response(raw, quality()).unwrap();
        assert_eq!(report.productivity_score, 100);

        let raw = r#"{"productivityScore": -20}"#;
        let report = parse_insight_response(raw, quality()).unwrap();
        assert_eq!(report.productivity_score, 0);
    }

    #[test]
    fn unknown_feedback_tags_normalize_to_neutral() {
        let raw = r#"{
            "xyzFeedback": [
                {"situation": "s", "behavior": "b", "impact": "i", "type": "celebratory"},
                {"situation": "s", "behavior": "b", "impact": "i"}
            ]
        }"#;
        let report = parse_insight_response(raw, quality()).unwrap();

        assert_eq!(report.xyz_feedback.len(), 2);
        assert_eq!(report.xyz_feedback[0].kind, FeedbackKind::Neutral);
        assert_eq!(report.xyz_feedback[1].kind, FeedbackKind::Neutral);
    }

    #[test]
    fn prose_without_json_is_a_malformed_response() {
        let raw = "the developer did a great job this sprint, with many commits.";
        match parse_insight_response(raw, quality()) {
            Err(InsightError::MalformedResponse(_)) => {}
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn non_object_json_is_a_malformed_response() {
        match parse_insight_response("[1, 2, 3]", quality()) {
            Err(InsightError::MalformedResponse(_)) => {}
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn report_serializes_to_camel_case_json() {
        let report = parse_insight_response(r#"{"productivityScore": 50}"#, quality()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("executiveSummary").is_some());
        assert!(json.get("productivityScore").is_some());
        assert!(json.get("areasOfImprovement").is_some());
        assert!(json["commitQuality"].get("conventionalUsagePercent").is_some());
    }
}
