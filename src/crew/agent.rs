//! Agent definition and the per-task execution loop.

use std::sync::Arc;

use crate::llm::{ChatMessage, ChatOptions, ChatResponse, LlmClient, Role, TokenUsage, ToolCall};
use crate::tools::{Tool, ToolRegistry};

/// The run-scoped language model configuration shared by every agent in a
/// crew: one client, one model id, one set of sampling options.
#[derive(Clone)]
pub struct ModelHandle {
    client: Arc<dyn LlmClient>,
    model: String,
    options: ChatOptions,
}

impl ModelHandle {
    /// Create a handle with default sampling options.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            options: ChatOptions::default(),
        }
    }

    /// Set the sampling temperature for every call made through this handle.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// The model identifier used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The sampling options used for requests.
    pub fn options(&self) -> &ChatOptions {
        &self.options
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model", &self.model)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// An agent: a role/goal/backstory prompt bundle with an optional toolset
/// and a shared model handle.
pub struct Agent {
    role: String,
    goal: String,
    backstory: String,
    allow_delegation: bool,
    tools: ToolRegistry,
    model: ModelHandle,
}

/// Result of an agent working one task to completion.
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Final text produced by the agent
    pub output: String,
    /// Token usage summed over every LLM call in the run
    pub usage: TokenUsage,
    /// Number of tool invocations made during the run
    pub tool_invocations: usize,
}

impl Agent {
    /// Create an agent with no tools and delegation disabled.
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        model: ModelHandle,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
            tools: ToolRegistry::empty(),
            model,
        }
    }

    /// Add a tool to this agent's ordered toolset.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    /// Set whether this agent may delegate work. The sequential pipeline
    /// never delegates; the flag is configuration surface only.
    pub fn with_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    pub fn allow_delegation(&self) -> bool {
        self.allow_delegation
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Build the system prompt from the agent's prompt bundle.
    fn system_prompt(&self) -> String {
        format!(
            "You are {role}.\n\nYour goal: {goal}\n\n{backstory}",
            role = self.role,
            goal = self.goal,
            backstory = self.backstory,
        )
    }

    /// Execute a single tool call requested by the model.
    ///
    /// Tool failures are folded into the conversation as error text so the
    /// model can react to them; they do not abort the run.
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> String {
        let args: serde_json::Value =
            serde_json::from_str(&tool_call.function.arguments).unwrap_or(serde_json::Value::Null);

        match self.tools.execute(&tool_call.function.name, args).await {
            Ok(output) => output,
            Err(e) => format!("Error: {}", e),
        }
    }

    async fn call_model(
        &self,
        messages: &[ChatMessage],
        use_tools: bool,
    ) -> anyhow::Result<ChatResponse> {
        let schemas = if use_tools {
            Some(self.tools.get_tool_schemas())
        } else {
            None
        };
        self.model
            .client
            .chat_completion_with_options(
                &self.model.model,
                messages,
                schemas.as_deref(),
                self.model.options.clone(),
            )
            .await
    }

    /// Work one task prompt to completion.
    ///
    /// # Algorithm
    /// 1. Call the model with the agent's system prompt and the task prompt
    /// 2. If the model requests tool calls: execute them, feed results back
    /// 3. Repeat until the model produces a final text response
    ///
    /// The loop is bounded by `max_iterations`; hitting the bound is an
    /// error, as is an empty final response.
    pub(crate) async fn run(
        &self,
        task_prompt: &str,
        max_iterations: usize,
    ) -> anyhow::Result<AgentRun> {
        let mut messages = vec![
            ChatMessage::new(Role::System, self.system_prompt()),
            ChatMessage::new(Role::User, task_prompt),
        ];

        let use_tools = !self.tools.is_empty();
        let mut usage = TokenUsage::default();
        let mut tool_invocations = 0usize;

        for iteration in 0..max_iterations {
            tracing::debug!(role = %self.role, iteration = iteration + 1, "agent loop");

            let response = self.call_model(&messages, use_tools).await?;

            if let Some(u) = &response.usage {
                usage = usage.add(u);
            }

            if let Some(tool_calls) = &response.tool_calls {
                if !tool_calls.is_empty() {
                    messages.push(ChatMessage {
                        role: Role::Assistant,
                        content: response.content.clone(),
                        tool_calls: Some(tool_calls.clone()),
                        tool_call_id: None,
                    });

                    for tool_call in tool_calls {
                        tracing::info!(
                            role = %self.role,
                            tool = %tool_call.function.name,
                            "executing tool call"
                        );
                        tool_invocations += 1;
                        let result = self.execute_tool_call(tool_call).await;
                        messages.push(ChatMessage::tool_result(tool_call.id.clone(), result));
                    }

                    continue;
                }
            }

            match response.content {
                Some(content) if !content.trim().is_empty() => {
                    return Ok(AgentRun {
                        output: content,
                        usage,
                        tool_invocations,
                    });
                }
                _ => anyhow::bail!("model returned an empty response for agent '{}'", self.role),
            }
        }

        anyhow::bail!(
            "agent '{}' hit the tool iteration limit ({}) without a final response",
            self.role,
            max_iterations
        )
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.role)
            .field("allow_delegation", &self.allow_delegation)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
