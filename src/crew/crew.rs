//! The crew: a fixed agent set and an ordered task sequence.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::{Agent, Task, TaskOutput};
use crate::llm::TokenUsage;

/// Errors from crew construction.
#[derive(Debug, Error)]
pub enum CrewError {
    #[error("task {task_index} is assigned to agent '{role}', which is not in the crew")]
    UnknownAgent { task_index: usize, role: String },

    #[error("a crew needs at least one task")]
    NoTasks,
}

/// Aggregate output of a crew run.
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    /// The final task's text (the deliverable)
    pub raw: String,
    /// Every task's output, in execution order
    pub task_outputs: Vec<TaskOutput>,
    /// Token usage summed over the whole run
    pub usage: TokenUsage,
}

/// A set of agents and the ordered tasks they work through.
///
/// Tasks run strictly in declared order; each task's output is passed as
/// context to every task after it.
pub struct Crew {
    agents: Vec<Arc<Agent>>,
    tasks: Vec<Task>,
    max_tool_iterations: usize,
}

impl Crew {
    /// Assemble a crew.
    ///
    /// # Errors
    ///
    /// Returns `CrewError::UnknownAgent` if any task's agent is not in
    /// `agents`, and `CrewError::NoTasks` for an empty task list.
    pub fn new(agents: Vec<Arc<Agent>>, tasks: Vec<Task>) -> Result<Self, CrewError> {
        if tasks.is_empty() {
            return Err(CrewError::NoTasks);
        }

        for (task_index, task) in tasks.iter().enumerate() {
            let known = agents.iter().any(|a| Arc::ptr_eq(a, task.agent()));
            if !known {
                return Err(CrewError::UnknownAgent {
                    task_index,
                    role: task.agent().role().to_string(),
                });
            }
        }

        Ok(Self {
            agents,
            tasks,
            max_tool_iterations: 8,
        })
    }

    /// Set the per-task cap on LLM/tool round-trips.
    pub fn with_max_tool_iterations(mut self, max_tool_iterations: usize) -> Self {
        self.max_tool_iterations = max_tool_iterations;
        self
    }

    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run every task in declared order and aggregate the outputs.
    ///
    /// The first failing task aborts the run; completed outputs are not
    /// recoverable partially.
    pub async fn kickoff(&self) -> anyhow::Result<CrewOutput> {
        let mut task_outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        let mut usage = TokenUsage::default();

        for (index, task) in self.tasks.iter().enumerate() {
            let agent = task.agent();
            tracing::info!(
                task = index + 1,
                total = self.tasks.len(),
                agent = %agent.role(),
                "starting task"
            );

            let prompt = task.prompt_with_context(&task_outputs);
            let run = agent.run(&prompt, self.max_tool_iterations).await?;

            tracing::info!(
                task = index + 1,
                agent = %agent.role(),
                tool_invocations = run.tool_invocations,
                total_tokens = run.usage.total_tokens,
                "task complete"
            );

            usage = usage.add(&run.usage);
            task_outputs.push(TaskOutput {
                agent_role: agent.role().to_string(),
                raw: run.output,
            });
        }

        // new() guarantees at least one task, so there is a last output.
        let raw = task_outputs
            .last()
            .map(|o| o.raw.clone())
            .unwrap_or_default();

        Ok(CrewOutput {
            raw,
            task_outputs,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::ModelHandle;
    use crate::llm::{
        ChatMessage, ChatOptions, ChatResponse, FunctionCall, LlmClient, Role, TokenUsage,
        ToolCall, ToolDefinition,
    };
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted client: pops one reply per call and records the prompts it saw.
    struct ScriptedLlm {
        replies: Mutex<Vec<ChatResponse>>,
        seen_prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn with_texts(texts: &[&str]) -> Self {
            let replies = texts
                .iter()
                .rev()
                .map(|t| text_response(t))
                .collect::<Vec<_>>();
            Self {
                replies: Mutex::new(replies),
                seen_prompts: Mutex::new(Vec::new()),
            }
        }

        fn with_responses(mut responses: Vec<ChatResponse>) -> Self {
            responses.reverse();
            Self {
                replies: Mutex::new(responses),
                seen_prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.seen_prompts.lock().unwrap().clone()
        }
    }

    fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            content: Some(text.to_string()),
            tool_calls: None,
            finish_reason: Some("stop".to_string()),
            usage: Some(TokenUsage::new(10, 5)),
            model: None,
        }
    }

    fn tool_call_response(name: &str, arguments: &str) -> ChatResponse {
        ChatResponse {
            content: None,
            tool_calls: Some(vec![ToolCall {
                id: "call_1".to_string(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }]),
            finish_reason: Some("tool_calls".to_string()),
            usage: Some(TokenUsage::new(10, 5)),
            model: None,
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion_with_options(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: Option<&[ToolDefinition]>,
            _options: ChatOptions,
        ) -> anyhow::Result<ChatResponse> {
            let user_prompt = messages
                .iter()
                .find(|m| m.role == Role::User)
                .and_then(|m| m.content.clone())
                .unwrap_or_default();
            self.seen_prompts.lock().unwrap().push(user_prompt);

            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| anyhow::anyhow!("scripted client ran out of replies"))
        }
    }

    struct CannedSearch;

    #[async_trait]
    impl Tool for CannedSearch {
        fn name(&self) -> &str {
            "web_search"
        }

        fn description(&self) -> &str {
            "Canned search results."
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            })
        }

        async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<String> {
            Ok("canned result".to_string())
        }
    }

    fn two_agent_crew(llm: Arc<ScriptedLlm>) -> (Arc<Agent>, Arc<Agent>, Crew) {
        let handle = ModelHandle::new(llm, "test-model");
        let researcher = Arc::new(Agent::new(
            "Researcher",
            "research things",
            "You research.",
            handle.clone(),
        ));
        let writer = Arc::new(Agent::new(
            "Writer",
            "write things",
            "You write.",
            handle,
        ));
        let tasks = vec![
            Task::new("Research the topic", "A brief", Arc::clone(&researcher)),
            Task::new("Write the article", "An article", Arc::clone(&writer)),
        ];
        let crew = Crew::new(
            vec![Arc::clone(&researcher), Arc::clone(&writer)],
            tasks,
        )
        .unwrap();
        (researcher, writer, crew)
    }

    #[tokio::test]
    async fn kickoff_runs_tasks_in_order_and_passes_context() {
        let llm = Arc::new(ScriptedLlm::with_texts(&[
            "RESEARCH BRIEF",
            "FINAL ARTICLE",
        ]));
        let (_, _, crew) = two_agent_crew(Arc::clone(&llm));

        let output = crew.kickoff().await.unwrap();

        assert_eq!(output.raw, "FINAL ARTICLE");
        assert_eq!(output.task_outputs.len(), 2);
        assert_eq!(output.task_outputs[0].agent_role, "Researcher");
        assert_eq!(output.task_outputs[0].raw, "RESEARCH BRIEF");
        assert_eq!(output.task_outputs[1].agent_role, "Writer");

        // The writing prompt must carry the research output: the writer
        // can only have been invoked after the researcher finished.
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Research the topic"));
        assert!(!prompts[0].contains("RESEARCH BRIEF"));
        assert!(prompts[1].contains("RESEARCH BRIEF"));
        assert!(prompts[1].contains("Write the article"));
    }

    #[tokio::test]
    async fn kickoff_aggregates_usage_across_tasks() {
        let llm = Arc::new(ScriptedLlm::with_texts(&["brief", "article"]));
        let (_, _, crew) = two_agent_crew(llm);

        let output = crew.kickoff().await.unwrap();
        assert_eq!(output.usage.prompt_tokens, 20);
        assert_eq!(output.usage.completion_tokens, 10);
        assert_eq!(output.usage.total_tokens, 30);
    }

    #[tokio::test]
    async fn kickoff_runs_tool_loop_before_final_answer() {
        let llm = Arc::new(ScriptedLlm::with_responses(vec![
            tool_call_response("web_search", r#"{"query":"topic"}"#),
            text_response("brief built from canned result"),
            text_response("article"),
        ]));
        let handle = ModelHandle::new(Arc::clone(&llm) as Arc<dyn LlmClient>, "test-model");

        let researcher = Arc::new(
            Agent::new("Researcher", "research", "You research.", handle.clone())
                .with_tool(Arc::new(CannedSearch)),
        );
        let writer = Arc::new(Agent::new("Writer", "write", "You write.", handle));

        let crew = Crew::new(
            vec![Arc::clone(&researcher), Arc::clone(&writer)],
            vec![
                Task::new("Research", "A brief", Arc::clone(&researcher)),
                Task::new("Write", "An article", Arc::clone(&writer)),
            ],
        )
        .unwrap();

        let output = crew.kickoff().await.unwrap();
        assert_eq!(output.raw, "article");
        assert_eq!(output.task_outputs[0].raw, "brief built from canned result");
    }

    #[tokio::test]
    async fn kickoff_propagates_llm_errors() {
        // No replies scripted: the first call errors.
        let llm = Arc::new(ScriptedLlm::with_texts(&[]));
        let (_, _, crew) = two_agent_crew(llm);

        let err = crew.kickoff().await.unwrap_err();
        assert!(err.to_string().contains("ran out of replies"));
    }

    #[test]
    fn new_rejects_task_bound_to_foreign_agent() {
        let llm = Arc::new(ScriptedLlm::with_texts(&[]));
        let handle = ModelHandle::new(llm, "test-model");
        let member = Arc::new(Agent::new("Member", "g", "b", handle.clone()));
        let outsider = Arc::new(Agent::new("Outsider", "g", "b", handle));

        let result = Crew::new(
            vec![member],
            vec![Task::new("Do it", "Done", outsider)],
        );

        match result {
            Err(CrewError::UnknownAgent { task_index, role }) => {
                assert_eq!(task_index, 0);
                assert_eq!(role, "Outsider");
            }
            other => panic!("expected UnknownAgent, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn new_rejects_empty_task_list() {
        let llm = Arc::new(ScriptedLlm::with_texts(&[]));
        let handle = ModelHandle::new(llm, "test-model");
        let agent = Arc::new(Agent::new("Member", "g", "b", handle));

        assert!(matches!(
            Crew::new(vec![agent], vec![]),
            Err(CrewError::NoTasks)
        ));
    }
}
