use crate::Result;
use crate::tools::{ToolCall, ToolDefinition};
use async_trait::async_trait;
use std::hash::{DefaultHasher, Hash, Hasher};

mod openai;
pub use openai::{DEFAULT_MODEL, DEFAULT_SEARCH_MODEL, OpenAI};

#[derive(Clone, Debug, Hash)]
pub enum Message {
    User(String),
    Assistant(String, Vec<ToolCall>),
    System(String),
    Tool {
        id: String,
        name: String,
        result: String,
    },
}

impl Message {
    /// Rough token estimate, about four characters per token.
    pub fn ntokens(&self) -> usize {
        let chars = match self {
            Message::User(content) | Message::System(content) => content.len(),
            Message::Assistant(content, calls) => {
                content.len() + calls.iter().map(|c| c.args.len()).sum::<usize>()
            }
            Message::Tool { result, .. } => result.len(),
        };
        chars.div_ceil(4)
    }

    pub fn get_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::System(content) => write!(f, "**system**\n\n{}\n\n", content),
            Message::User(content) => write!(f, "**user**\n\n{}\n\n", content),
            Message::Assistant(content, calls) => {
                write!(f, "**assistant**\n\n{}\n\n", content)?;
                calls.iter().try_for_each(|call| write!(f, "{}\n", call))?;
                Ok(())
            }
            Message::Tool { name, result, .. } => {
                write!(f, "**tool: {}**\n\n{}\n\n", name, result)
            }
        }
    }
}

pub struct CompletionRequest<'a> {
    pub messages: &'a [Message],
    pub tools: &'a [ToolDefinition],
    pub web_search_tool: bool,
}

pub struct CompletionResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

#[async_trait]
pub trait LLM {
    async fn completion<'a>(&self, request: CompletionRequest<'a>) -> Result<CompletionResponse>;
}
