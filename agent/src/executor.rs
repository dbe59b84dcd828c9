use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs a task document and returns its free-text result. Implementations
/// are opaque to the caller and may never return; see [`crate::Runner`].
#[async_trait]
pub trait Executor {
    async fn execute(&self, document: &str) -> Result<String>;
}

/// Adapts a synchronous function into an [`Executor`] by running it on
/// tokio's blocking pool.
pub struct BlockingExecutor<F> {
    f: Arc<F>,
}

impl<F> BlockingExecutor<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F> Executor for BlockingExecutor<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync + 'static,
{
    async fn execute(&self, document: &str) -> Result<String> {
        let f = self.f.clone();
        let document = document.to_string();
        tokio::task::spawn_blocking(move || f(&document)).await?
    }
}
