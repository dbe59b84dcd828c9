use crate::Result;
use crate::llm::{CompletionRequest, LLM, Message};
use crate::tools::{NoArgs, Tool, ToolCall, ToolDefinition};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_TOKEN_THRESHOLD: usize = 5000;

/// Replaces the middle of a long conversation with a model-written
/// summary. The leading system and user prompts and the last `keep_last`
/// messages are kept verbatim.
pub struct SummarizeHistory {
    llm: Arc<dyn LLM + Send + Sync>,
    keep_last: usize,
    threshold: usize,
}

impl SummarizeHistory {
    pub fn new(llm: Arc<dyn LLM + Send + Sync>, keep_last: usize) -> Box<Self> {
        Box::new(Self {
            llm,
            keep_last,
            threshold: DEFAULT_TOKEN_THRESHOLD,
        })
    }

    /// Estimated history size above which the callback summarizes.
    pub fn threshold(mut self: Box<Self>, tokens: usize) -> Box<Self> {
        self.threshold = tokens;
        self
    }

    pub fn over_threshold(&self, messages: &[Message]) -> bool {
        messages.iter().map(Message::ntokens).sum::<usize>() > self.threshold
    }

    pub async fn summarize_history(&self, mut messages: Vec<Message>) -> Result<Vec<Message>> {
        // nothing between the task prompts and the kept tail
        if messages.len() <= 2 + self.keep_last {
            return Ok(messages);
        }

        // tool replies stay with the assistant message that called them
        let mut split = messages.len() - self.keep_last;
        while split > 2 && matches!(messages[split], Message::Tool { .. }) {
            split -= 1;
        }
        if split <= 2 {
            return Ok(messages);
        }

        let last_messages = messages.split_off(split);

        messages.push(Message::User(PROMPT.to_string()));

        let result = self
            .llm
            .completion(CompletionRequest {
                messages: &messages,
                tools: &[],
                web_search_tool: false,
            })
            .await?;

        messages.truncate(2);
        messages.push(Message::Assistant(result.content, vec![]));
        messages.extend(last_messages);

        Ok(messages)
    }
}

const PROMPT: &str = "To keep the conversation from growing too long, write a summary of the conversation so far.
Instructions:
- Compress the information as much as possible; the summary must not exceed 1000 words.
- Preserve every finding, source and figure needed to produce the final answer for your task.
- Anything stored with the memory tools can still be read back later and need not be repeated.";

#[async_trait]
impl Tool for SummarizeHistory {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<NoArgs>(
            "summarize_history",
            &format!(
                "Condense the conversation so far into a short summary that keeps the key findings. The last {} messages are left unchanged. This runs automatically when the conversation becomes too long.",
                self.keep_last
            ),
        )
    }

    async fn invoke(&mut self, call: &ToolCall, messages: Vec<Message>) -> Result<Vec<Message>> {
        let mut messages = self.summarize_history(messages).await?;
        messages.push(call.reply("conversation history summarized".to_string()));
        Ok(messages)
    }
}
