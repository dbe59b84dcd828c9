use async_openai::error::OpenAIError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Yaml error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Openai error: {0}")]
    OpenaiError(#[from] OpenAIError),

    #[error("No response from llm: {0}")]
    LLMResponseError(String),

    #[error("Tool {0} does not exist")]
    ToolDoesNotExist(String),

    #[error("Missing arg: {0}")]
    MissingArg(String),

    #[error("Task join error: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),

    #[error("Agent workflow error: {0}")]
    AgentWorkflowError(String),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),

    /// A required input was missing, nothing was submitted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid task document: {0}")]
    InvalidDocument(String),

    #[error("Task did not complete within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Task execution failed: {0}")]
    Execution(String),

    #[error("Task completed but produced no output")]
    EmptyResult,
}
