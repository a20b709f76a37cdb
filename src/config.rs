//! Configuration management for copydesk.
//!
//! Configuration can be set via environment variables (a `.env` file is
//! loaded by the binaries before this runs):
//! - `OPENAI_API_KEY` - Required. Key for the chat-completion API.
//! - `SERPER_API_KEY` - Required. Key for the Serper.dev search API.
//! - `DEFAULT_MODEL` - Optional. Model used by both agents. Defaults to `gpt-4`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `SEARCH_RESULT_COUNT` - Optional. Results per web search. Defaults to `1`.
//! - `MAX_TOOL_ITERATIONS` - Optional. Cap on LLM/tool round-trips per task. Defaults to `8`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the chat-completion endpoint
    pub openai_api_key: String,

    /// API key for the Serper.dev search endpoint
    pub serper_api_key: String,

    /// Model identifier used by every agent in a run
    pub default_model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Number of results the search tool asks for per query
    pub search_result_count: u32,

    /// Maximum LLM/tool round-trips per task
    pub max_tool_iterations: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENAI_API_KEY` or
    /// `SERPER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let serper_api_key = std::env::var("SERPER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("SERPER_API_KEY".to_string()))?;

        let default_model = std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "gpt-4".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let search_result_count = std::env::var("SEARCH_RESULT_COUNT")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("SEARCH_RESULT_COUNT".to_string(), format!("{}", e))
            })?;

        let max_tool_iterations = std::env::var("MAX_TOOL_ITERATIONS")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("MAX_TOOL_ITERATIONS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            openai_api_key,
            serper_api_key,
            default_model,
            host,
            port,
            search_result_count,
            max_tool_iterations,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(openai_api_key: String, serper_api_key: String, default_model: String) -> Self {
        Self {
            openai_api_key,
            serper_api_key,
            default_model,
            host: "127.0.0.1".to_string(),
            port: 3000,
            search_result_count: 1,
            max_tool_iterations: 8,
        }
    }
}
