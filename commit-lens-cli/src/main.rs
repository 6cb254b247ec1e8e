use clap::Parser;
use commit_lens_core::{
    execute_insight_flow, style, AnalysisReport, CoreCliArgs, FeedbackKind,
};

#[tokio::main]
async fn main() {
    let args = CoreCliArgs::parse();
    let as_json = args.json;

    match execute_insight_flow(args).await {
        Ok(report) => {
            if as_json {
                print_json(&report);
            } else {
                render_report(&report);
            }
        }
        Err(e) => {
            eprintln!(
                "{} {} {}",
                style("❌"),
                style("commit-lens failed:").red().bold(),
                style(&e).red()
            );
            std::process::exit(1);
        }
    }
}

fn print_json(report: &AnalysisReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("{} {}", style("❌ failed to encode report:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn render_report(report: &AnalysisReport) {
    let params = &report.params;
    let stats = &report.stats;
    let insight = &report.insight;

    println!("\n{}", style("commit-lens 🔍 contribution report").cyan().bold());
    println!(
        "{}\n",
        style(format!(
            "{}/{} · author {} · from {} to {}",
            params.owner, params.repo, params.author, params.since, params.until
        ))
        .dim()
    );

    println!("{}", style("statistics:").cyan().bold());
    println!(
        "  {} commits · +{} / -{} lines (net {}) · {} files",
        stats.total_commits,
        stats.total_additions,
        stats.total_deletions,
        stats.net_changes,
        stats.files_modified
    );
    if stats.largest_commit.changes > 0 {
        let first_line = stats
            .largest_commit
            .message
            .lines()
            .next()
            .unwrap_or_default();
        println!(
            "  largest commit: {} ({} lines) - {}",
            &stats.largest_commit.sha[..stats.largest_commit.sha.len().min(7)],
            stats.largest_commit.changes,
            first_line
        );
    }
    println!();

    let score = insight.productivity_score;
    let score_text = format!("productivity score: {score}/100");
    let styled_score = if score >= 80 {
        style(score_text).green().bold()
    } else if score >= 50 {
        style(score_text).yellow().bold()
    } else {
        style(score_text).red().bold()
    };
    println!("{styled_score}\n");

    if !insight.executive_summary.is_empty() {
        println!("{}", style("summary:").cyan().bold());
        println!("{}\n", insight.executive_summary);
    }

    if !insight.xyz_feedback.is_empty() {
        println!("{}", style("feedback:").cyan().bold());
        for item in &insight.xyz_feedback {
            let marker = match item.kind {
                FeedbackKind::Positive => style("+").green().bold(),
                FeedbackKind::Improvement => style("~").yellow().bold(),
                FeedbackKind::Neutral => style("·").dim(),
            };
            println!("  {} {}", marker, style(&item.situation).bold());
            println!("    {}", item.behavior);
            println!("    {}", style(&item.impact).dim());
        }
        println!();
    }

    print_list("strengths:", &insight.strengths);
    print_list("areas to improve:", &insight.areas_of_improvement);
    print_list("recommendations:", &insight.recommendations);
    print_list("implemented features:", &insight.implemented_features);

    let quality = &insight.commit_quality;
    println!("{}", style("commit message quality:").cyan().bold());
    println!(
        "  average length {} chars · conventional commits {}% · descriptive score {}/100",
        quality.average_message_length,
        quality.conventional_usage_percent,
        quality.descriptive_score
    );
    for suggestion in &quality.suggestions {
        println!("  - {suggestion}");
    }
    println!();

    if !report.timeline.is_empty() {
        println!("{}", style("recent activity:").cyan().bold());
        for event in report.timeline.iter().take(5) {
            println!("  {}", style(&event.date).bold());
            for commit in &event.commits {
                println!(
                    "    {} {} (+{}/-{})",
                    style(&commit.sha).yellow(),
                    commit.message,
                    commit.additions,
                    commit.deletions
                );
            }
        }
        println!();
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}", style(title).cyan().bold());
    for item in items {
        println!("  - {item}");
    }
    println!();
}
