//! Task execution with timeouts and retries

use chrono::Utc;
use sparkflow_client::ClientError;
use std::future::Future;
use thiserror::Error;
use tokio::time::{self, Duration};
use tracing::{error, info, warn};

use super::report::{TaskRecord, TaskStatus};
use crate::scheduler::{PollError, SensorError};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error("Task {task} timed out after {timeout:?}")]
    TimedOut { task: String, timeout: Duration },

    #[error("{0}")]
    Invalid(String),
}

impl TaskError {
    /// Whether another attempt may help
    ///
    /// A sensor that ran out of time fails the task outright; retrying would
    /// only extend its deadline.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TaskError::Sensor(SensorError::Timeout { .. }))
    }
}

/// How a task is run: execution timeout per attempt and retries
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskPolicy {
    pub timeout: Option<Duration>,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl TaskPolicy {
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Runs `work` under `policy` and records what happened
///
/// Each attempt is bounded by the policy timeout. Failed attempts are retried
/// `policy.retries` times after `policy.retry_delay`, unless the error is not
/// retryable.
pub async fn run_task<T, F, Fut>(
    name: &str,
    policy: TaskPolicy,
    mut work: F,
) -> (Result<T, TaskError>, TaskRecord)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TaskError>>,
{
    let started_at = Utc::now();
    let max_attempts = policy.retries + 1;
    let mut attempts = 0;

    let result = loop {
        attempts += 1;
        info!("Running task {} (attempt {}/{})", name, attempts, max_attempts);

        let outcome = match policy.timeout {
            Some(timeout) => match time::timeout(timeout, work()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(TaskError::TimedOut {
                    task: name.to_string(),
                    timeout,
                }),
            },
            None => work().await,
        };

        match outcome {
            Ok(value) => break Ok(value),
            Err(e) if attempts < max_attempts && e.is_retryable() => {
                warn!(
                    "Task {} failed (attempt {}/{}): {}; retrying in {:?}",
                    name, attempts, max_attempts, e, policy.retry_delay
                );
                time::sleep(policy.retry_delay).await;
            }
            Err(e) => break Err(e),
        }
    };

    let (status, error) = match &result {
        Ok(_) => {
            info!("Task {} succeeded", name);
            (TaskStatus::Success, None)
        }
        Err(e) => {
            error!("Task {} failed: {}", name, e);
            (TaskStatus::Failed, Some(e.to_string()))
        }
    };

    let record = TaskRecord {
        name: name.to_string(),
        status,
        attempts,
        started_at: Some(started_at),
        finished_at: Some(Utc::now()),
        error,
    };

    (result, record)
}
