//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::llm::TokenUsage;

/// Request to generate an article.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// The topic to research and write about. Passed through as-is, even
    /// when empty.
    pub topic: String,

    /// Sampling temperature in [0.0, 1.0] applied to every model call in
    /// the run (provider default if not given)
    pub temperature: Option<f64>,
}

/// Response with the generated article.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// The article in markdown
    pub markdown: String,

    /// Suggested download filename (`<slug>_article.md`)
    pub filename: String,

    /// Token usage summed over the whole run
    pub usage: TokenUsage,
}

/// Error payload for failed generations.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Display message for the error banner
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Model used by the pipeline agents
    pub model: String,
}
