use crate::executor::Executor;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::{Instant, Interval};
use tracing::{debug, info, warn};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(300);

/// How one run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunResult {
    Success(String),
    /// The executor finished without error but returned only whitespace.
    Empty,
    TimedOut,
    Failed(String),
}

impl RunResult {
    fn from_join(joined: std::result::Result<Result<String>, JoinError>) -> Self {
        match joined {
            Ok(Ok(output)) if output.trim().is_empty() => RunResult::Empty,
            Ok(Ok(output)) => RunResult::Success(output),
            Ok(Err(err)) => RunResult::Failed(err.to_string()),
            Err(err) => RunResult::Failed(format!("executor stopped unexpectedly: {}", err)),
        }
    }

    /// Maps the non-success cases onto [`Error`]. `deadline` is reported
    /// in the timeout error.
    pub fn into_result(self, deadline: Duration) -> Result<String> {
        match self {
            RunResult::Success(output) => Ok(output),
            RunResult::Empty => Err(Error::EmptyResult),
            RunResult::TimedOut => Err(Error::Timeout(deadline)),
            RunResult::Failed(message) => Err(Error::Execution(message)),
        }
    }
}

/// Snapshot handed to the progress callback while a run is in flight.
#[derive(Clone, Copy, Debug)]
pub struct Progress {
    pub elapsed: Duration,
    pub deadline: Duration,
}

impl Progress {
    /// Share of the deadline used so far, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.deadline.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.deadline.as_secs_f64()).min(1.0)
    }
}

type ProgressFn = Box<dyn Fn(Progress) + Send + Sync>;

pub struct Runner {
    deadline: Duration,
    progress: Option<(Duration, ProgressFn)>,
}

impl Runner {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            progress: None,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Calls `f` every `interval` until the run ends.
    pub fn with_progress(
        mut self,
        interval: Duration,
        f: impl Fn(Progress) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some((interval, Box::new(f)));
        self
    }

    /// Invokes `executor` exactly once on its own task and waits for it up
    /// to the deadline. A timed out call is detached, not cancelled, and
    /// may keep running until it finishes on its own.
    pub async fn run(
        &self,
        executor: Arc<dyn Executor + Send + Sync>,
        document: String,
    ) -> RunResult {
        let started = Instant::now();
        info!(
            deadline_secs = self.deadline.as_secs_f64(),
            document_bytes = document.len(),
            "task submitted"
        );

        let mut handle = tokio::spawn(async move { executor.execute(&document).await });

        let timeout = tokio::time::sleep(self.deadline);
        tokio::pin!(timeout);

        // an interval too long to schedule never ticks
        let mut ticker = self.progress.as_ref().and_then(|(interval, _)| {
            let period = (*interval).max(Duration::from_millis(1));
            started
                .checked_add(period)
                .map(|first| tokio::time::interval_at(first, period))
        });

        loop {
            tokio::select! {
                joined = &mut handle => {
                    let result = RunResult::from_join(joined);
                    let elapsed_secs = started.elapsed().as_secs_f64();
                    match &result {
                        RunResult::Success(output) => {
                            info!(elapsed_secs, output_bytes = output.len(), "task completed")
                        }
                        RunResult::Empty => warn!(elapsed_secs, "task completed with empty output"),
                        RunResult::Failed(message) => warn!(elapsed_secs, error = %message, "task failed"),
                        RunResult::TimedOut => {}
                    }
                    return result;
                }
                _ = &mut timeout => {
                    warn!(
                        deadline_secs = self.deadline.as_secs_f64(),
                        "task timed out, no longer waiting for it"
                    );
                    return RunResult::TimedOut;
                }
                _ = next_tick(&mut ticker) => {
                    let progress = Progress {
                        elapsed: started.elapsed(),
                        deadline: self.deadline,
                    };
                    debug!(elapsed_secs = progress.elapsed.as_secs_f64(), "task still running");
                    if let Some((_, f)) = &self.progress {
                        f(progress);
                    }
                }
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE)
    }
}
