// prompt construction module - renders the analysis document sent to the model

use crate::github::{CommitRecord, RunParams};
use crate::stats::AggregateStats;

/// commits included in the detailed diff section
const MAX_PROMPT_COMMITS: usize = 15;
/// file entries included per selected commit
const MAX_FILES_PER_COMMIT: usize = 5;
/// characters of patch text kept per file entry
const MAX_PATCH_CHARS: usize = 800;
/// languages listed in the statistics section
const MAX_TOP_LANGUAGES: usize = 5;

/// system prompt framing the model as a reviewer that answers with bare json
pub fn get_system_prompt() -> &'static str {
    "you are an expert in developer productivity and code quality analysis. \
     you give feedback using the situation-behavior-impact pattern: the observed \
     technical context, the specific action taken, and the concrete effect of that \
     action. be constructive, specific, and actionable in your recommendations. \
     IMPORTANT: respond ONLY with a single valid json object, with no text before \
     or after it."
}

/// select the most significant commits by total churn; sort_by is stable, so
/// equal-churn commits stay in received order
pub fn select_significant_commits(commits: &[CommitRecord]) -> Vec<&CommitRecord> {
    let mut ranked: Vec<&CommitRecord> = commits.iter().collect();
    ranked.sort_by(|a, b| churn(b).cmp(&churn(a)));
    ranked.truncate(MAX_PROMPT_COMMITS);
    ranked
}

fn churn(record: &CommitRecord) -> u64 {
    record
        .stats
        .as_ref()
        .map_or(0, |s| s.additions + s.deletions)
}

/// render the full analysis prompt; a pure function, identical inputs always
/// produce identical text
pub fn build_analysis_prompt(
    stats: &AggregateStats,
    commits: &[CommitRecord],
    params: &RunParams,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "analyse in depth the contributions of developer \"{}\" in the repository \"{}/{}\"\nbetween {} and {}.\n\n",
        params.author, params.owner, params.repo, params.since, params.until
    ));

    prompt.push_str("## IMPORTANT: qualitative analysis of the changes\n");
    prompt.push_str("below are the most significant commits with the REAL code diffs.\n");
    prompt.push_str(
        "analyse WHAT WAS IMPLEMENTED, IMPROVED OR FIXED from the actual code, not just the statistics.\n\n",
    );

    prompt.push_str("## overall statistics:\n");
    prompt.push_str(&format!("- total commits: {}\n", stats.total_commits));
    prompt.push_str(&format!("- lines added: {}\n", stats.total_additions));
    prompt.push_str(&format!("- lines removed: {}\n", stats.total_deletions));
    prompt.push_str(&format!("- net change: {} lines\n", stats.net_changes));
    prompt.push_str(&format!("- files modified: {}\n", stats.files_modified));
    prompt.push_str(&format!(
        "- average commit size: {} lines\n",
        stats.average_commit_size.round() as i64
    ));
    prompt.push('\n');

    prompt.push_str("## most used languages:\n");
    prompt.push_str(&top_languages(stats));
    prompt.push_str("\n\n");

    prompt.push_str("## DETAILED COMMIT ANALYSIS WITH DIFFS:\n");
    for record in select_significant_commits(commits) {
        push_commit_section(&mut prompt, record);
    }

    prompt.push_str("\n## distribution by weekday:\n");
    let weekdays = stats
        .commits_by_weekday
        .iter()
        .map(|(day, count)| format!("{day}: {count} commits"))
        .collect::<Vec<_>>()
        .join(", ");
    prompt.push_str(&weekdays);
    prompt.push('\n');

    push_instructions(&mut prompt);

    prompt
}

/// top languages by churn; count descending, alphabetical on ties since the
/// underlying map is ordered and the sort is stable
fn top_languages(stats: &AggregateStats) -> String {
    let mut entries: Vec<(&String, &u64)> = stats.language_distribution.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    entries
        .iter()
        .take(MAX_TOP_LANGUAGES)
        .map(|(language, changes)| format!("{language}: {changes} changes"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_commit_section(prompt: &mut String, record: &CommitRecord) {
    let short_sha = record.sha.get(..7).unwrap_or(&record.sha);
    let day = record.commit.author.date.format("%Y-%m-%d");
    let (additions, deletions) = record
        .stats
        .as_ref()
        .map_or((0, 0), |s| (s.additions, s.deletions));

    prompt.push_str(&format!("\n### commit: {short_sha} - {day}\n"));
    prompt.push_str(&format!("message: \"{}\"\n", record.commit.message));
    prompt.push_str(&format!("impact: +{additions}/-{deletions} lines\n"));
    prompt.push_str("modified files:\n");

    match record.files.as_deref() {
        Some(files) if !files.is_empty() => {
            for file in files.iter().take(MAX_FILES_PER_COMMIT) {
                prompt.push_str(&format!(
                    "  - {} ({}): +{}/-{}\n",
                    file.filename, file.status, file.additions, file.deletions
                ));
                if let Some(patch) = file.patch.as_deref() {
                    prompt.push_str("    changes:\n```\n");
                    prompt.push_str(&truncate_patch(patch));
                    prompt.push_str("\n```\n");
                }
            }
        }
        _ => prompt.push_str("  (no file details)\n"),
    }
}

/// clip patch text to the per-file budget, marking the cut explicitly; this
/// caps prompt size independent of real diff size
pub fn truncate_patch(patch: &str) -> String {
    if patch.len() <= MAX_PATCH_CHARS {
        return patch.to_string();
    }

    // cut on a char boundary at or below the budget
    let mut end = MAX_PATCH_CHARS;
    while end > 0 && !patch.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n... (truncated)", &patch[..end])
}

fn push_instructions(prompt: &mut String) {
    prompt.push_str("\n---\n\n## ANALYSIS INSTRUCTIONS:\n\n");
    prompt.push_str("1. ANALYSE THE REAL CODE in the diffs - do not rely only on counts or commit messages.\n");
    prompt.push_str("2. identify IMPLEMENTED FEATURES - what did the developer build? which new features?\n");
    prompt.push_str("3. identify IMPROVEMENTS - was code refactored? performance improved? bugs fixed?\n");
    prompt.push_str("4. use the situation-behavior-impact format for every insight:\n");
    prompt.push_str("   - situation: the technical context of what existed or was needed\n");
    prompt.push_str("   - behavior: what exactly was implemented or changed, based on the code\n");
    prompt.push_str("   - impact: the concrete benefit of that change\n\n");
    prompt.push_str("respond with a complete analysis as a json object with this exact structure:\n");
    prompt.push_str("{\n");
    prompt.push_str("    \"executiveSummary\": \"2-3 paragraph summary focused on WHAT WAS BUILT AND IMPROVED, not on numbers. be specific about the features and improvements implemented.\",\n");
    prompt.push_str("    \"xyzFeedback\": [\n");
    prompt.push_str("        {\n");
    prompt.push_str("            \"situation\": \"technical context (e.g. 'the login form had no input validation')\",\n");
    prompt.push_str("            \"behavior\": \"what was implemented (e.g. 'added client-side validation with regex for email and password strength')\",\n");
    prompt.push_str("            \"impact\": \"concrete benefit (e.g. 'reduces user errors and improves safety before submission')\",\n");
    prompt.push_str("            \"type\": \"positive | improvement | neutral\"\n");
    prompt.push_str("        }\n");
    prompt.push_str("    ],\n");
    prompt.push_str("    \"recommendations\": [\"specific technical recommendations based on the analysed code\"],\n");
    prompt.push_str("    \"productivityScore\": 0-100,\n");
    prompt.push_str("    \"strengths\": [\"TECHNICAL strengths identified in the code\"],\n");
    prompt.push_str("    \"areasOfImprovement\": [\"technical areas that could improve, based on the code seen\"],\n");
    prompt.push_str("    \"commitQualitySuggestions\": [\"suggestions to improve the commit messages\"],\n");
    prompt.push_str("    \"implementedFeatures\": [\"the concrete features and improvements identified in the diffs\"]\n");
    prompt.push_str("}\n\n");
    prompt.push_str("IMPORTANT:\n");
    prompt.push_str("- produce at least 5-8 feedback items covering different technical aspects of the contributions.\n");
    prompt.push_str("- every feedback item must be SPECIFIC and grounded in the analysed code, not generic.\n");
    prompt.push_str("- return the json object with no surrounding prose or markdown fences.\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{CommitAuthor, CommitMeta, CommitTotals, FileChange};
    use crate::stats::aggregate_commits;
    use chrono::DateTime;

    fn record(sha: &str, additions: u64, deletions: u64, patch: Option<&str>) -> CommitRecord {
        CommitRecord {
            sha: sha.to_string(),
            commit: CommitMeta {
                author: CommitAuthor {
                    name: "dev".to_string(),
                    email: "dev@example.com".to_string(),
                    date: DateTime::parse_from_rfc3339("2024-03-04T10:00:00Z").unwrap(),
                },
                message: format!("feat: change {sha}"),
            },
            stats: Some(CommitTotals {
                additions,
                deletions,
                total: additions + deletions,
            }),
            files: Some(vec![FileChange {
                filename: "src/lib.rs".to_string(),
                status: "modified".to_string(),
                additions,
                deletions,
                changes: additions + deletions,
                patch: patch.map(str::to_string),
            }]),
        }
    }

    fn params() -> RunParams {
        RunParams {
            owner: "acme".to_string(),
            repo: "rocket".to_string(),
            author: "coyote".to_string(),
            since: "2024-01-01T00:00:00Z".to_string(),
            until: "2024-02-01T00:00:00Z".to_string(),
            branch: None,
        }
    }

    #[test]
    fn selection_ranks_by_churn_descending() {
        let commits = vec![
            record("small", 1, 0, None),
            record("biggest", 90, 20, None),
            record("medium", 30, 5, None),
        ];
        let selected = select_significant_commits(&commits);

        assert_eq!(selected[0].sha, "biggest");
        assert_eq!(selected[1].sha, "medium");
        assert_eq!(selected[2].sha, "small");
    }

    #[test]
    fn selection_ties_keep_input_order() {
        let commits = vec![
            record("first", 10, 10, None),
            record("second", 15, 5, None),
            record("third", 5, 15, None),
        ];
        let selected = select_significant_commits(&commits);

        assert_eq!(selected[0].sha, "first");
        assert_eq!(selected[1].sha, "second");
        assert_eq!(selected[2].sha, "third");
    }

    #[test]
    fn selection_caps_at_fifteen_commits() {
        let commits: Vec<CommitRecord> = (0..40)
            .map(|i| record(&format!("sha{i:02}"), i, 0, None))
            .collect();
        assert_eq!(select_significant_commits(&commits).len(), 15);
    }

    #[test]
    fn short_patches_pass_through_unchanged() {
        assert_eq!(truncate_patch("@@ -1 +1 @@"), "@@ -1 +1 @@");
    }

    #[test]
    fn long_patches_are_clipped_with_a_marker() {
        let patch = "x".repeat(2000);
        let clipped = truncate_patch(&patch);

        assert!(clipped.ends_with("... (truncated)"));
        assert!(clipped.len() < patch.len());
        assert!(clipped.starts_with(&"x".repeat(800)));
    }

    #[test]
    fn rendering_is_deterministic() {
        let commits = vec![record("aaa", 10, 5, Some("@@ -1,2 +1,4 @@"))];
        let stats = aggregate_commits(&commits);
        let params = params();

        let first = build_analysis_prompt(&stats, &commits, &params);
        let second = build_analysis_prompt(&stats, &commits, &params);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_history_still_renders_a_well_formed_prompt() {
        let stats = aggregate_commits(&[]);
        let prompt = build_analysis_prompt(&stats, &[], &params());

        assert!(prompt.contains("total commits: 0"));
        assert!(prompt.contains("ANALYSIS INSTRUCTIONS"));
        assert!(prompt.contains("xyzFeedback"));
    }

    #[test]
    fn prompt_embeds_truncated_diff_excerpts() {
        let patch = format!("@@ -1,2 +1,4 @@\n{}", "+line\n".repeat(400));
        let commits = vec![record("aaa", 400, 0, Some(&patch))];
        let stats = aggregate_commits(&commits);

        let prompt = build_analysis_prompt(&stats, &commits, &params());
        assert!(prompt.contains("### commit: aaa"));
        assert!(prompt.contains("... (truncated)"));
    }
}
