//! Web search tool backed by the Serper.dev API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Tool;

const SERPER_API_URL: &str = "https://google.serper.dev/search";

/// Search the web via Serper.dev.
///
/// Returns a small fixed number of results per query, configured at
/// construction time.
pub struct SerperSearch {
    client: reqwest::Client,
    api_key: String,
    num_results: u32,
}

impl SerperSearch {
    /// Create a new search tool.
    ///
    /// `num_results` is the number of results requested per query.
    pub fn new(api_key: String, num_results: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            num_results,
        }
    }

    async fn search(&self, query: &str) -> anyhow::Result<String> {
        let request = SerperRequest {
            q: query.to_string(),
            num: self.num_results,
        };

        let response = self
            .client
            .post(SERPER_API_URL)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Serper API error ({}): {}", status, error_text);
        }

        let search_response: SerperResponse = response.json().await?;
        Ok(format_results(query, &search_response))
    }
}

#[async_trait]
impl Tool for SerperSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for real-time information. Returns search results with titles, snippets and URLs. Use for finding recent developments, statistics, expert opinions, or any information you need to verify."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;

        self.search(query).await
    }
}

/// Serper API request body.
#[derive(Debug, Serialize)]
struct SerperRequest {
    q: String,
    num: u32,
}

/// Serper API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerperResponse {
    #[serde(default)]
    answer_box: Option<SerperAnswerBox>,
    #[serde(default)]
    organic: Vec<SerperOrganicResult>,
}

/// The highlighted answer box, when Serper returns one.
#[derive(Debug, Deserialize)]
struct SerperAnswerBox {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

/// A single organic search result.
#[derive(Debug, Deserialize)]
struct SerperOrganicResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Format a Serper response as readable text for the model.
fn format_results(query: &str, response: &SerperResponse) -> String {
    let mut output = String::new();

    if let Some(answer_box) = &response.answer_box {
        if let Some(answer) = answer_box.answer.as_deref().or(answer_box.snippet.as_deref()) {
            output.push_str("## Quick Answer\n\n");
            output.push_str(answer);
            output.push_str("\n\n---\n\n");
        }
    }

    if response.organic.is_empty() {
        if output.is_empty() {
            return format!("No results found for: {}", query);
        }
        return output;
    }

    output.push_str("## Results\n\n");
    for (i, result) in response.organic.iter().enumerate() {
        output.push_str(&format!(
            "### {}. {}\n**URL:** {}\n\n{}\n\n",
            i + 1,
            result.title,
            result.link,
            result.snippet.as_deref().unwrap_or("(no snippet)")
        ));
    }

    output
}
