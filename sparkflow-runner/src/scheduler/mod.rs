//! Scheduler layer for the runner
//!
//! Long-running waits on the external cluster service: cluster readiness
//! and step completion. Both sleep between checks and hold no local
//! resources, so dropping their futures cancels them cleanly.

pub mod poller;
pub mod sensor;

pub use poller::{ClusterReadinessPoller, PollError};
pub use sensor::{SensorError, StepSensor};
