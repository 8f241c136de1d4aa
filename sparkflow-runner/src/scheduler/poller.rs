//! Cluster readiness poller
//!
//! Repeatedly describes a freshly created cluster until it is idle and able
//! to accept steps (`WAITING`), or until it has terminated.
//!
//! ```text
//! POLLING --WAITING--> READY
//! POLLING --TERMINATED--> FAILED
//! POLLING --anything else--> sleep(interval) --> POLLING
//! ```
//!
//! Only `TERMINATED` fails the wait. `TERMINATED_WITH_ERRORS` and unknown
//! state strings take the same path as known transitional states.
//! Without `max_polls` the loop is unbounded; callers that need a deadline
//! wrap the future in a timeout.

use sparkflow_client::{ClientError, ClusterApi};
use sparkflow_core::domain::cluster::{Cluster, ClusterState};
use sparkflow_core::domain::handle::ClusterHandle;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{self, Duration};
use tracing::{debug, info, warn};

/// Errors raised while waiting for a cluster to become ready
#[derive(Debug, Error)]
pub enum PollError {
    /// The cluster terminated before it ever reached `WAITING`
    #[error("Cluster {cluster} terminated unexpectedly (state: {state})")]
    ClusterUnavailable {
        cluster: ClusterHandle,
        state: ClusterState,
    },

    /// `max_polls` checks were made without reaching a decision
    #[error("Cluster {cluster} not ready after {attempts} poll(s), last state: {last_state}")]
    PollLimitExceeded {
        cluster: ClusterHandle,
        attempts: u32,
        last_state: ClusterState,
    },

    /// The describe call failed; not retried
    #[error("Failed to describe cluster {cluster}: {source}")]
    Client {
        cluster: ClusterHandle,
        #[source]
        source: ClientError,
    },
}

/// Blocks until a cluster is ready for step submission
#[derive(Clone)]
pub struct ClusterReadinessPoller {
    api: Arc<dyn ClusterApi>,
    interval: Duration,
    max_polls: Option<u32>,
}

impl ClusterReadinessPoller {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    /// Creates an unbounded poller
    pub fn new(api: Arc<dyn ClusterApi>, interval: Duration) -> Self {
        Self {
            api,
            interval,
            max_polls: None,
        }
    }

    /// Caps the number of describe calls
    pub fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Polls until the cluster is `WAITING` or terminated
    ///
    /// Returns the last description on success. The first check happens
    /// immediately; the interval is only slept between checks.
    pub async fn wait_until_ready(&self, cluster: &ClusterHandle) -> Result<Cluster, PollError> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let described = self
                .api
                .describe_cluster(cluster)
                .await
                .map_err(|source| PollError::Client {
                    cluster: cluster.clone(),
                    source,
                })?;
            let state = described.status.state.clone();

            info!("Cluster {} status is {} (poll {})", cluster, state, attempts);

            if state.is_ready() {
                info!(
                    "Cluster {} is {} and ready for step submission",
                    cluster, state
                );
                return Ok(described);
            }

            if state == ClusterState::Terminated {
                if let Some(reason) = &described.status.state_change_reason {
                    warn!(
                        "Cluster {} terminated: {} {}",
                        cluster,
                        reason.code.as_deref().unwrap_or("-"),
                        reason.message.as_deref().unwrap_or("")
                    );
                }
                return Err(PollError::ClusterUnavailable {
                    cluster: cluster.clone(),
                    state,
                });
            }

            match &state {
                ClusterState::TerminatedWithErrors => {
                    warn!("Cluster {} reported {}; polling again", cluster, state)
                }
                ClusterState::Unknown(raw) => {
                    debug!("Treating unrecognised state '{}' as transitional", raw)
                }
                _ => {}
            }

            if let Some(max_polls) = self.max_polls {
                if attempts >= max_polls {
                    return Err(PollError::PollLimitExceeded {
                        cluster: cluster.clone(),
                        attempts,
                        last_state: state,
                    });
                }
            }

            info!("Retrying in {:?}", self.interval);
            time::sleep(self.interval).await;
        }
    }
}
