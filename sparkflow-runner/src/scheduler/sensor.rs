//! Step completion sensor
//!
//! Pokes a submitted step until it reaches a terminal state or the sensor
//! timeout runs out.

use sparkflow_client::{ClientError, ClusterApi};
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use sparkflow_core::domain::step::{Step, StepState};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{self, Duration, Instant};
use tracing::info;

#[derive(Debug, Error)]
pub enum SensorError {
    /// The step ended in CANCELLED, FAILED or INTERRUPTED
    #[error("Step {step} ended in state {state}: {reason}")]
    StepFailed {
        step: StepHandle,
        state: StepState,
        reason: String,
    },

    #[error("Step {step} still not finished after {timeout:?}")]
    Timeout { step: StepHandle, timeout: Duration },

    #[error("Failed to describe step {step}: {source}")]
    Client {
        step: StepHandle,
        #[source]
        source: ClientError,
    },
}

/// Waits for a step to finish
#[derive(Clone)]
pub struct StepSensor {
    api: Arc<dyn ClusterApi>,
    poke_interval: Duration,
    timeout: Duration,
}

impl StepSensor {
    pub fn new(api: Arc<dyn ClusterApi>, poke_interval: Duration, timeout: Duration) -> Self {
        Self {
            api,
            poke_interval,
            timeout,
        }
    }

    /// Pokes until the step completes, fails or the timeout is reached
    ///
    /// The timeout is checked after every non-terminal poke, so the last poke
    /// happens at or just before the deadline.
    pub async fn wait_for_completion(
        &self,
        cluster: &ClusterHandle,
        step: &StepHandle,
    ) -> Result<Step, SensorError> {
        let started = Instant::now();

        loop {
            let described = self
                .api
                .describe_step(cluster, step)
                .await
                .map_err(|source| SensorError::Client {
                    step: step.clone(),
                    source,
                })?;
            let state = described.status.state.clone();

            info!("Step {} on cluster {} is {}", step, cluster, state);

            if state.is_success() {
                return Ok(described);
            }

            if state.is_failure() {
                let reason = described
                    .status
                    .failure_details
                    .as_ref()
                    .map(|d| d.summary())
                    .unwrap_or_else(|| "no failure details reported".to_string());
                return Err(SensorError::StepFailed {
                    step: step.clone(),
                    state,
                    reason,
                });
            }

            if started.elapsed() >= self.timeout {
                return Err(SensorError::Timeout {
                    step: step.clone(),
                    timeout: self.timeout,
                });
            }

            time::sleep(self.poke_interval).await;
        }
    }
}
