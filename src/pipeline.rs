//! The content pipeline: research analyst + content writer.
//!
//! This is the declarative heart of copydesk: two agents, two tasks, one
//! shared model handle, assembled per run for a given topic.

use std::sync::Arc;

use crate::config::Config;
use crate::crew::{Agent, Crew, CrewError, ModelHandle, Task};
use crate::llm::LlmClient;
use crate::tools::{SerperSearch, Tool};

/// Build the research analyst agent for a topic.
///
/// The topic is substituted verbatim into the agent's goal.
pub fn research_analyst(topic: &str, model: ModelHandle, search: Arc<dyn Tool>) -> Agent {
    Agent::new(
        "Senior Research Analyst",
        format!(
            "Research, analyze and synthesize comprehensive information on {} from reliable web sources",
            topic
        ),
        "You are an expert research analyst with advanced web research skills. You excel at finding, \
         analyzing and synthesizing information from across the internet using search tools. You are \
         skilled at distinguishing reliable sources from unreliable ones, fact-checking, \
         cross-referencing information and identifying key patterns and insights. You provide \
         well-organized research briefs with proper citations and source verification. Your analysis \
         includes both raw data and interpreted insights, making complex information accessible and \
         actionable.",
        model,
    )
    .with_tool(search)
}

/// Build the content writer agent.
pub fn content_writer(model: ModelHandle) -> Agent {
    Agent::new(
        "Content Writer",
        "Transform research findings into engaging blog posts while maintaining accuracy",
        "You are a skilled content writer specialised in creating engaging, accessible content from \
         technical research. You work closely with the Senior Research Analyst and excel at maintaining \
         the perfect balance between informative and entertaining writing while ensuring all facts and \
         citations from the research are properly incorporated. You have a talent for making complex \
         topics approachable without oversimplifying them.",
        model,
    )
}

/// Build the research task for a topic, assigned to the given agent.
pub fn research_task(topic: &str, agent: Arc<Agent>) -> Task {
    Task::new(
        format!(
            "1. Conduct comprehensive research on {} including:\n\
                - Recent developments and news\n\
                - Key industry trends and innovations\n\
                - Expert opinions and analysis\n\
                - Statistical data and market insights\n\
             2. Evaluate source credibility and fact-check all information\n\
             3. Organize findings into a structured research brief\n\
             4. Include all relevant citations and sources",
            topic
        ),
        "A detailed research report containing:\n\
         - Executive summary of key findings\n\
         - Comprehensive analysis of current trends and developments\n\
         - List of verified facts and statistics\n\
         - All citations and links to original sources\n\
         - Clear categorisation of main themes and patterns\n\
         Format with clear sections and bullet points for easy reference.",
        agent,
    )
}

/// Build the writing task, assigned to the given agent.
pub fn writing_task(agent: Arc<Agent>) -> Task {
    Task::new(
        "Using the research brief provided, create an engaging blog post that:\n\
         1. Transforms technical information into accessible content\n\
         2. Maintains all factual accuracy and citations from the research\n\
         3. Includes:\n\
            - Attention-grabbing introduction\n\
            - Well-structured body sections with clear headings\n\
            - Compelling conclusion\n\
         4. Preserves all source citations in [Source: URL] format\n\
         5. Includes a References section at the end",
        "A polished blog post in markdown format that:\n\
         - Engages readers while maintaining accuracy\n\
         - Contains properly structured sections\n\
         - Includes inline citations hyperlinked to the original source URL\n\
         - Presents information in an accessible yet informative way\n\
         - Follows proper markdown formatting, using H1 for the title and H3 for sub-sections",
        agent,
    )
}

/// Assemble the two-stage crew for a topic.
///
/// One model handle is built here and shared by both agents; the optional
/// `temperature` applies to every model call in the run.
pub fn content_crew(
    config: &Config,
    llm: Arc<dyn LlmClient>,
    topic: &str,
    temperature: Option<f64>,
) -> Result<Crew, CrewError> {
    let mut model = ModelHandle::new(llm, config.default_model.clone());
    if let Some(temperature) = temperature {
        model = model.with_temperature(temperature);
    }

    let search: Arc<dyn Tool> = Arc::new(SerperSearch::new(
        config.serper_api_key.clone(),
        config.search_result_count,
    ));

    let analyst = Arc::new(research_analyst(topic, model.clone(), search));
    let writer = Arc::new(content_writer(model));

    let tasks = vec![
        research_task(topic, Arc::clone(&analyst)),
        writing_task(Arc::clone(&writer)),
    ];

    Ok(Crew::new(vec![analyst, writer], tasks)?
        .with_max_tool_iterations(config.max_tool_iterations))
}
