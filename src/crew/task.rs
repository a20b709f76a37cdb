//! Task definition and per-task output.

use std::sync::Arc;

use serde::Serialize;

use super::Agent;

/// A unit of work bound to exactly one agent.
pub struct Task {
    description: String,
    expected_output: String,
    agent: Arc<Agent>,
}

impl Task {
    /// Create a task assigned to the given agent.
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<Agent>,
    ) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    /// Build the user prompt for this task, prepending context from the
    /// outputs of earlier tasks when there are any.
    pub(crate) fn prompt_with_context(&self, context: &[TaskOutput]) -> String {
        let mut prompt = String::new();

        if !context.is_empty() {
            prompt.push_str("Context from earlier work:\n\n");
            for output in context {
                prompt.push_str(&format!("## From {}\n\n{}\n\n", output.agent_role, output.raw));
            }
            prompt.push_str("---\n\n");
        }

        prompt.push_str(&self.description);
        prompt.push_str("\n\nExpected output:\n");
        prompt.push_str(&self.expected_output);
        prompt
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("description", &self.description)
            .field("agent", &self.agent.role())
            .finish_non_exhaustive()
    }
}

/// Output of one completed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    /// Role of the agent that produced this output
    pub agent_role: String,
    /// The text the agent produced
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::ModelHandle;
    use crate::llm::{ChatMessage, ChatOptions, ChatResponse, LlmClient, ToolDefinition};
    use async_trait::async_trait;

    struct NullLlm;

    #[async_trait]
    impl LlmClient for NullLlm {
        async fn chat_completion_with_options(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[ToolDefinition]>,
            _options: ChatOptions,
        ) -> anyhow::Result<ChatResponse> {
            anyhow::bail!("not used")
        }
    }

    fn test_agent(role: &str) -> Arc<Agent> {
        let handle = ModelHandle::new(Arc::new(NullLlm), "test-model");
        Arc::new(Agent::new(role, "goal", "backstory", handle))
    }

    #[test]
    fn prompt_without_context_is_description_and_expectation() {
        let task = Task::new("Do the thing", "A finished thing", test_agent("Worker"));
        let prompt = task.prompt_with_context(&[]);
        assert!(prompt.starts_with("Do the thing"));
        assert!(prompt.contains("Expected output:\nA finished thing"));
        assert!(!prompt.contains("Context from earlier work"));
    }

    #[test]
    fn prompt_with_context_prepends_earlier_outputs() {
        let task = Task::new("Write it up", "An article", test_agent("Writer"));
        let context = vec![TaskOutput {
            agent_role: "Researcher".to_string(),
            raw: "key findings".to_string(),
        }];
        let prompt = task.prompt_with_context(&context);
        assert!(prompt.starts_with("Context from earlier work"));
        assert!(prompt.contains("## From Researcher"));
        assert!(prompt.contains("key findings"));
        let context_pos = prompt.find("key findings").unwrap();
        let description_pos = prompt.find("Write it up").unwrap();
        assert!(context_pos < description_pos);
    }
}
