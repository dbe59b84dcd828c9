use crate::executor::Executor;
use crate::runner::{RunResult, Runner};
use crate::spec::TaskSpec;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Provider credential. Only ever handed to the executor that needs it;
/// `Debug` does not reveal it.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(Error::Configuration("an OpenAI API key is required".to_string()));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

type Connect = Box<dyn Fn(&ApiKey) -> Result<Arc<dyn Executor + Send + Sync>> + Send + Sync>;

/// What a submission produced: the document that was sent and how the run
/// ended.
#[derive(Debug)]
pub struct Outcome {
    pub document: String,
    pub result: RunResult,
    pub deadline: Duration,
}

impl Outcome {
    pub fn into_result(self) -> Result<String> {
        self.result.into_result(self.deadline)
    }
}

/// Turns form submissions into bounded runs. Each submission is
/// independent; nothing carries over between them.
pub struct Session {
    runner: Runner,
    connect: Connect,
}

impl Session {
    /// `connect` builds an executor for a validated credential.
    pub fn new(
        runner: Runner,
        connect: impl Fn(&ApiKey) -> Result<Arc<dyn Executor + Send + Sync>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            runner,
            connect: Box::new(connect),
        }
    }

    /// Fails only on configuration problems, before anything is run.
    /// Everything that happens during the run is reported in the
    /// [`Outcome`].
    pub async fn submit(&self, api_key: &str, spec: &TaskSpec) -> Result<Outcome> {
        let api_key = ApiKey::new(api_key)?;
        let document = spec.to_yaml()?;
        let executor = (self.connect)(&api_key)?;

        info!(
            role = spec.role_id(),
            task = spec.task_id(),
            tools = ?spec.capabilities(),
            "submitting task"
        );

        let result = self.runner.run(executor, document.clone()).await;

        Ok(Outcome {
            document,
            result,
            deadline: self.runner.deadline(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiKey, Session};
    use crate::executor::{BlockingExecutor, Executor};
    use crate::runner::{RunResult, Runner};
    use crate::template::Template;
    use crate::{Error, Result};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn echo_session(connects: Arc<AtomicUsize>) -> Session {
        Session::new(Runner::new(Duration::from_secs(5)), move |key: &ApiKey| {
            assert_eq!(key.expose(), "sk-test");
            connects.fetch_add(1, Ordering::SeqCst);
            let executor: Arc<dyn Executor + Send + Sync> =
                Arc::new(BlockingExecutor::new(|doc: &str| Ok(doc.to_string())));
            Ok(executor)
        })
    }

    #[tokio::test]
    async fn test_missing_key_short_circuits() -> Result<()> {
        let connects = Arc::new(AtomicUsize::new(0));
        let session = echo_session(connects.clone());
        let spec = Template::find("space").unwrap().builder().build()?;

        for key in ["", "   "] {
            let result = session.submit(key, &spec).await;
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
        assert_eq!(connects.load(Ordering::SeqCst), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_runs_document() -> Result<()> {
        let connects = Arc::new(AtomicUsize::new(0));
        let session = echo_session(connects.clone());
        let spec = Template::find("space").unwrap().builder().build()?;

        let outcome = session.submit(" sk-test ", &spec).await?;

        assert_eq!(outcome.document, spec.to_yaml()?);
        assert_eq!(outcome.result, RunResult::Success(spec.to_yaml()?));
        assert_eq!(outcome.into_result()?, spec.to_yaml()?);
        assert_eq!(connects.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[test]
    fn test_key_is_redacted() -> Result<()> {
        let key = ApiKey::new("sk-secret")?;
        assert!(!format!("{:?}", key).contains("sk-secret"));
        Ok(())
    }
}
