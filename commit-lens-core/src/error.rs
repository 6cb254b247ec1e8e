// error taxonomy for the analysis pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    /// the generative-model credential is a hard precondition, checked
    /// before any remote call is made
    #[error("OPENROUTER_API_KEY environment variable is not set")]
    MissingCredential,

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// the model call succeeded transport-wise but returned no content
    #[error("model returned an empty response")]
    EmptyModelResponse,

    /// model content was present but not parseable after fence stripping
    #[error("model response is not a valid json object: {0}")]
    MalformedResponse(String),

    /// transport failure from the commit source or the model client,
    /// propagated unchanged
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// non-success http status from the commit source or the model client
    #[error("upstream api error ({status}): {body}")]
    UpstreamStatus { status: u16, body: String },
}
