// model client module - single chat-completions call against openrouter

use crate::error::{InsightError, Result};
use crate::github::{CommitRecord, RunParams};
use crate::quality::CommitQualityMetrics;
use crate::stats::AggregateStats;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::normalize::{parse_insight_response, InsightReport};
use super::prompts::{build_analysis_prompt, get_system_prompt};

const CHAT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// model used when neither the cli flag nor OPENROUTER_MODEL is set
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

// chat completions api structures
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// run the synthesis pipeline: render the prompt, invoke the model once, and
/// normalize the raw response into a fully populated report with the locally
/// computed quality metrics merged in
pub async fn generate_insight_report(
    api_key: &str,
    model: &str,
    stats: &AggregateStats,
    commits: &[CommitRecord],
    quality: CommitQualityMetrics,
    params: &RunParams,
) -> Result<InsightReport> {
    let prompt = build_analysis_prompt(stats, commits, params);
    let raw = invoke_model(api_key, model, &prompt).await?;
    parse_insight_response(&raw, quality)
}

/// send one chat-completions request; the credential is passed explicitly and
/// no retry is attempted, failures surface verbatim to the caller
pub async fn invoke_model(api_key: &str, model: &str, prompt: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: get_system_prompt().to_string(),
            },
            Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            },
        ],
        temperature: Some(0.7),
        max_tokens: Some(4000),
    };

    let response = client
        .post(CHAT_COMPLETIONS_URL)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

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

    let body = response.json::<ChatResponse>().await?;
    let content = body
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .unwrap_or_default();

    // an empty response is a distinct failure from a malformed one
    if content.trim().is_empty() {
        return Err(InsightError::EmptyModelResponse);
    }

    Ok(content)
}
