mod agent;
pub mod callbacks;
pub mod capability;
pub mod crew;
mod error;
pub mod executor;
pub mod llm;
pub mod runner;
pub mod session;
pub mod spec;
pub mod template;
pub mod tools;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use agent::{Agent, AgentBuilder, DEFAULT_MAX_STEPS, FinalAnswer, StopCondition};
pub use capability::Capability;
pub use crew::CrewExecutor;
pub use executor::{BlockingExecutor, Executor};
pub use runner::{DEFAULT_DEADLINE, Progress, RunResult, Runner};
pub use session::{ApiKey, Outcome, Session};
pub use spec::{Document, TaskSpec, TaskSpecBuilder};
pub use template::Template;
