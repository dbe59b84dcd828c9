use crate::Result;
use crate::llm::Message;
use crate::tools::SummarizeHistory;
use async_trait::async_trait;

mod logger;
pub use logger::MessageLogger;

/// Runs after every agent step and may rewrite the history.
#[async_trait]
pub trait Callback {
    async fn call(&mut self, messages: Vec<Message>) -> Result<Vec<Message>>;
}

#[async_trait]
impl Callback for SummarizeHistory {
    async fn call(&mut self, messages: Vec<Message>) -> Result<Vec<Message>> {
        if self.over_threshold(&messages) {
            tracing::debug!(messages = messages.len(), "summarizing agent history");
            return self.summarize_history(messages).await;
        }
        Ok(messages)
    }
}

/// Emits one `tracing` event per agent step.
pub struct StepTracker {
    label: String,
    step: u32,
}

impl StepTracker {
    pub fn new(label: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            label: label.into(),
            step: 0,
        })
    }
}

#[async_trait]
impl Callback for StepTracker {
    async fn call(&mut self, messages: Vec<Message>) -> Result<Vec<Message>> {
        self.step += 1;
        let tool_calls = match messages.last() {
            Some(Message::Assistant(_, calls)) => calls.len(),
            _ => 0,
        };
        tracing::info!(
            task = %self.label,
            step = self.step,
            history = messages.len(),
            tool_calls,
            "agent step finished"
        );
        Ok(messages)
    }
}
