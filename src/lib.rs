//! # copydesk
//!
//! A two-agent content pipeline: a research analyst gathers and verifies
//! information about a topic using live web search, then a content writer
//! turns the research brief into a polished markdown article.
//!
//! ## Architecture
//!
//! ```text
//!   topic ──► ┌────────────────────┐      ┌────────────────────┐
//!             │  Research Analyst  │ ───► │   Content Writer   │ ──► article.md
//!             │  (web_search tool) │brief │    (no tools)      │
//!             └────────────────────┘      └────────────────────┘
//! ```
//!
//! ## Task Flow
//! 1. Build the crew for a topic (two agents, two tasks, shared model handle)
//! 2. `Crew::kickoff` runs the tasks strictly in declared order
//! 3. Each task output is passed as context to the tasks after it
//! 4. The final task's text is the article
//!
//! ## Modules
//! - `crew`: agents, tasks, and the sequential pipeline runner
//! - `llm`: chat-completion client trait and the OpenAI implementation
//! - `tools`: tool trait, registry, and the Serper web-search tool
//! - `pipeline`: the research/writing crew configuration
//! - `api`: HTTP server for the interactive web form

pub mod api;
pub mod config;
pub mod crew;
pub mod llm;
pub mod pipeline;
pub mod tools;
pub mod util;

pub use config::Config;
pub use crew::{Agent, Crew, CrewOutput, ModelHandle, Task};
