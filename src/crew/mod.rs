//! Crew module - declarative agents, tasks, and the sequential runner.
//!
//! # Types
//! - **Agent**: role/goal/backstory prompt bundle plus tools and a model handle
//! - **Task**: instructions and expected output bound to exactly one agent
//! - **Crew**: runs its tasks strictly in declared order, feeding each
//!   task's output to the tasks after it as context
//!
//! # Invariants
//! - Every task's agent is a member of the crew's agent set (checked at
//!   construction)
//! - All agents in a crew share one model handle (the pipeline builder
//!   constructs it once and clones it)

mod agent;
mod crew;
mod task;

pub use agent::{Agent, AgentRun, ModelHandle};
pub use crew::{Crew, CrewError, CrewOutput};
pub use task::{Task, TaskOutput};
