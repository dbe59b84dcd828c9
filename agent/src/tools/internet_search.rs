use crate::Result;
use crate::llm::{CompletionRequest, LLM, Message};
use crate::tools::{FunctionalTool, ToolCall, ToolDefinition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Looks things up on the web through a separate model that has hosted
/// search enabled. That model is never offered function tools.
pub struct InternetSearchTool {
    llm: Arc<dyn LLM + Send + Sync>,
}

impl InternetSearchTool {
    pub fn new(llm: Arc<dyn LLM + Send + Sync>) -> Box<Self> {
        Box::new(Self { llm })
    }
}

#[derive(Deserialize, JsonSchema)]
struct SearchArgs {
    /// What to look up, phrased as a question or search query
    query: String,
}

const PROMPT: &str = "Search the web to answer the query. Reply with the relevant facts, figures and dates, and list the sources you used.";

#[async_trait]
impl FunctionalTool for InternetSearchTool {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<SearchArgs>(
            "internet_search",
            "Search the internet for current information. Returns a short digest with sources.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: SearchArgs = call.args()?;

        let result = self
            .llm
            .completion(CompletionRequest {
                messages: &[Message::System(PROMPT.to_string()), Message::User(args.query)],
                tools: &[],
                web_search_tool: true,
            })
            .await?;

        Ok(call.reply(result.content))
    }
}
