//! Sparkflow Runner
//!
//! Runs a transient-cluster pipeline against the cluster-management API:
//! provision a cluster, wait until it is ready, submit one step, wait for the
//! step and tear the cluster down again.
//!
//! Architecture:
//! - Configuration: settings from environment or defaults
//! - Scheduler: readiness poller and step sensor (the long waits)
//! - Pipeline: task ordering, retries, timeouts and the run report
//!
//! The API client is always passed in explicitly as an `Arc<dyn ClusterApi>`.

pub mod config;
pub mod pipeline;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use pipeline::{Pipeline, PipelineReport, PipelineSettings, TaskStatus};
pub use scheduler::{ClusterReadinessPoller, PollError, SensorError, StepSensor};
