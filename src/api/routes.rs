//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::llm::{LlmClient, OpenAiClient};
use crate::pipeline;
use crate::util;

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// The chat-completion client shared by every request
    pub llm: Arc<dyn LlmClient>,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));

    let state = Arc::new(AppState { config, llm });

    let app = Router::new()
        .route("/", get(index))
        .route("/api/generate", post(generate))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for ctrl-c / SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Serve the embedded single-page form.
async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.config.default_model.clone(),
    })
}

/// Run one pipeline invocation for the submitted topic.
///
/// Blocks until the final task resolves. Any pipeline error is caught here
/// and returned as a JSON error payload; the server never dies from a
/// failed generation.
async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, topic = %req.topic, temperature = ?req.temperature, "generate request");

    let result = async {
        let crew = pipeline::content_crew(
            &state.config,
            Arc::clone(&state.llm),
            &req.topic,
            req.temperature,
        )?;
        crew.kickoff().await
    }
    .await;

    match result {
        Ok(output) => {
            tracing::info!(
                %request_id,
                total_tokens = output.usage.total_tokens,
                "generate complete"
            );
            Ok(Json(GenerateResponse {
                markdown: output.raw,
                filename: util::article_filename(&req.topic),
                usage: output.usage,
            }))
        }
        Err(e) => {
            tracing::error!(%request_id, "generate failed: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("An error occurred: {}", e),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ChatOptions, ChatResponse, ToolDefinition};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn chat_completion_with_options(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[ToolDefinition]>,
            _options: ChatOptions,
        ) -> anyhow::Result<ChatResponse> {
            anyhow::bail!("quota exceeded")
        }
    }

    /// Answers every call with the next canned text.
    struct SequentialLlm {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for SequentialLlm {
        async fn chat_completion_with_options(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[ToolDefinition]>,
            _options: ChatOptions,
        ) -> anyhow::Result<ChatResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let text = if call == 0 { "brief" } else { "article" };
            Ok(ChatResponse {
                content: Some(text.to_string()),
                tool_calls: None,
                finish_reason: Some("stop".to_string()),
                usage: None,
                model: None,
            })
        }
    }

    fn test_state(llm: Arc<dyn LlmClient>) -> Arc<AppState> {
        Arc::new(AppState {
            config: Config::new(
                "sk-test".to_string(),
                "serper-test".to_string(),
                "gpt-4".to_string(),
            ),
            llm,
        })
    }

    #[tokio::test]
    async fn generate_maps_pipeline_errors_to_error_payload() {
        let state = test_state(Arc::new(FailingLlm));

        let result = generate(
            State(state),
            Json(GenerateRequest {
                topic: "Anything".to_string(),
                temperature: Some(0.2),
            }),
        )
        .await;

        let (status, Json(body)) = result.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.error.starts_with("An error occurred:"));
        assert!(body.error.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn generate_passes_empty_topic_through_without_panicking() {
        let state = test_state(Arc::new(FailingLlm));

        // The upstream failure surfaces as an error payload; nothing panics
        // locally on the empty topic.
        let result = generate(
            State(state),
            Json(GenerateRequest {
                topic: String::new(),
                temperature: None,
            }),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn generate_returns_article_and_slugged_filename() {
        let state = test_state(Arc::new(SequentialLlm {
            calls: AtomicUsize::new(0),
        }));

        let result = generate(
            State(state),
            Json(GenerateRequest {
                topic: "Medical Industry!".to_string(),
                temperature: Some(0.7),
            }),
        )
        .await;

        let Json(body) = result.unwrap();
        assert_eq!(body.markdown, "article");
        assert_eq!(body.filename, "medical_industry!_article.md");
    }

    #[tokio::test]
    async fn health_reports_configured_model() {
        let state = test_state(Arc::new(FailingLlm));
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.model, "gpt-4");
    }
}
