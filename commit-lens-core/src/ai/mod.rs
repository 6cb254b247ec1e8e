// ai module - prompt construction, model invocation, and response
// normalization

pub mod api;
pub mod normalize;
pub mod prompts;

// re-export key public items for convenient access
pub use api::{generate_insight_report, invoke_model, DEFAULT_MODEL};
pub use normalize::{
    parse_insight_response, strip_code_fences, FeedbackKind, InsightReport, XyzFeedback,
};
pub use prompts::{build_analysis_prompt, get_system_prompt, select_significant_commits};
