//! Script-mode entry point: run the pipeline once for a fixed topic and
//! print the article to stdout.

use std::sync::Arc;

use copydesk::config::Config;
use copydesk::llm::{LlmClient, OpenAiClient};
use copydesk::pipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TOPIC: &str = "Medical industry using Generative AI";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "copydesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));

    let crew = pipeline::content_crew(&config, llm, TOPIC, None)?;
    let output = crew.kickoff().await?;

    println!("{}", output.raw);

    Ok(())
}
