use crate::Result;
use crate::callbacks::Callback;
use crate::llm::Message;
use async_trait::async_trait;
use std::io::Write;

/// Appends the conversation to a markdown transcript, writing only what
/// is new since the previous step.
pub struct MessageLogger<W: Write + Send> {
    last_hashes: Vec<u64>,
    writer: W,
    step: u32,
}

impl<W: Write + Send> MessageLogger<W> {
    pub fn new(name: &str, mut writer: W) -> Result<Box<Self>> {
        write!(writer, "## {}\n\n", name)?;

        Ok(Box::new(Self {
            last_hashes: Vec::new(),
            writer,
            step: 0,
        }))
    }

    fn display_messages(&mut self, messages: &[Message]) -> Result<()> {
        write!(self.writer, "### Step {}\n\n", self.step)?;

        messages
            .iter()
            .try_for_each(|m| write!(self.writer, "{}", m))?;

        write!(self.writer, "---\n\n")?;

        Ok(())
    }

    fn display_history_cleared(&mut self) -> Result<()> {
        write!(self.writer, "#### [HISTORY SUMMARIZED]\n\n")?;
        Ok(())
    }

    fn prefix_match_len(&self, new_hashes: &[u64]) -> usize {
        new_hashes
            .iter()
            .zip(self.last_hashes.iter())
            .take_while(|&(a, b)| a == b)
            .count()
    }
}

#[async_trait]
impl<W: Write + Send> Callback for MessageLogger<W> {
    async fn call(&mut self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let new_hashes = messages.iter().map(Message::get_hash).collect::<Vec<_>>();

        if self.prefix_match_len(&new_hashes) != self.last_hashes.len() {
            self.display_history_cleared()?;
            self.display_messages(&messages)?;
        } else {
            self.display_messages(&messages[self.last_hashes.len()..])?;
        }

        self.writer.flush()?;

        self.step += 1;
        self.last_hashes = new_hashes;

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::MessageLogger;
    use crate::Result;
    use crate::callbacks::Callback;
    use crate::llm::Message;

    #[tokio::test]
    async fn test_logs_only_new_messages() -> Result<()> {
        let mut logger = MessageLogger::new("astronomer/task", Vec::new())?;

        let mut history = vec![Message::User("first".to_string())];
        history = logger.call(history).await?;
        history.push(Message::Assistant("second".to_string(), vec![]));
        logger.call(history).await?;

        let text = std::str::from_utf8(&logger.writer).unwrap();
        assert!(text.starts_with("## astronomer/task\n\n### Step 0\n\n**user**\n\nfirst"));
        assert_eq!(text.matches("first").count(), 1);
        assert!(text.contains("### Step 1\n\n**assistant**\n\nsecond"));
        assert!(!text.contains("SUMMARIZED"));

        Ok(())
    }

    #[tokio::test]
    async fn test_rewritten_history_is_logged_in_full() -> Result<()> {
        let mut logger = MessageLogger::new("t", Vec::new())?;

        logger
            .call(vec![
                Message::User("a".to_string()),
                Message::User("b".to_string()),
            ])
            .await?;
        logger.call(vec![Message::User("a".to_string())]).await?;

        let text = std::str::from_utf8(&logger.writer).unwrap();
        assert!(text.contains("#### [HISTORY SUMMARIZED]\n\n### Step 1\n\n**user**\n\na"));

        Ok(())
    }
}
