//! Scripted in-memory `ClusterApi` for tests
//!
//! Cluster and step states are replayed in order; once a script has a single
//! entry left, that entry is returned forever.

use async_trait::async_trait;
use sparkflow_client::{ClientError, ClusterApi, Result};
use sparkflow_core::domain::cluster::{Cluster, ClusterState, ClusterStatus};
use sparkflow_core::domain::definition::{ClusterDefinition, StepDefinition};
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use sparkflow_core::domain::step::{FailureDetails, Step, StepState, StepStatus};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

pub fn cluster_handle() -> ClusterHandle {
    ClusterHandle::new("j-TEST").unwrap()
}

pub fn step_handle() -> StepHandle {
    StepHandle::new("s-TEST").unwrap()
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct Calls {
    log: Vec<&'static str>,
    counts: HashMap<&'static str, usize>,
}

pub struct ScriptedClusterApi {
    cluster_states: Mutex<VecDeque<ClusterState>>,
    step_states: Mutex<VecDeque<StepState>>,
    failures: HashMap<(&'static str, usize), u16>,
    calls: Mutex<Calls>,
}

impl ScriptedClusterApi {
    pub fn new() -> Self {
        Self {
            cluster_states: Mutex::new(VecDeque::from([ClusterState::Waiting])),
            step_states: Mutex::new(VecDeque::from([StepState::Completed])),
            failures: HashMap::new(),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn cluster_states(self, states: &[&str]) -> Self {
        assert!(!states.is_empty(), "cluster state script needs at least one state");
        *self.cluster_states.lock().unwrap() = states.iter().map(|s| ClusterState::from(*s)).collect();
        self
    }

    pub fn step_states(self, states: &[&str]) -> Self {
        assert!(!states.is_empty(), "step state script needs at least one state");
        *self.step_states.lock().unwrap() = states.iter().map(|s| StepState::from(*s)).collect();
        self
    }

    /// Fails the `call`-th (1-based) invocation of `operation` with an API error
    pub fn fail(mut self, operation: &'static str, call: usize, status: u16) -> Self {
        self.failures.insert((operation, call), status);
        self
    }

    pub fn fail_describe_cluster_at(self, call: usize, status: u16) -> Self {
        self.fail("describe_cluster", call, status)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().log.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .counts
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn describe_cluster_calls(&self) -> usize {
        self.count("describe_cluster")
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.log.push(operation);
        let count = calls.counts.entry(operation).or_insert(0);
        *count += 1;

        match self.failures.get(&(operation, *count)) {
            Some(status) => Err(ClientError::api_error(
                *status,
                format!("scripted {} failure", operation),
            )),
            None => Ok(()),
        }
    }

    fn next<T: Clone>(script: &Mutex<VecDeque<T>>) -> T {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().expect("empty state script")
        }
    }
}

#[async_trait]
impl ClusterApi for ScriptedClusterApi {
    async fn create_cluster(&self, _definition: &ClusterDefinition) -> Result<ClusterHandle> {
        self.record("create_cluster")?;
        Ok(cluster_handle())
    }

    async fn describe_cluster(&self, cluster: &ClusterHandle) -> Result<Cluster> {
        self.record("describe_cluster")?;
        Ok(Cluster {
            id: cluster.clone(),
            name: "test".to_string(),
            status: ClusterStatus {
                state: Self::next(&self.cluster_states),
                state_change_reason: None,
            },
        })
    }

    async fn add_steps(
        &self,
        _cluster: &ClusterHandle,
        steps: &[StepDefinition],
    ) -> Result<Vec<StepHandle>> {
        self.record("add_steps")?;
        Ok(steps
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if i == 0 {
                    step_handle()
                } else {
                    StepHandle::new(format!("s-TEST{}", i)).unwrap()
                }
            })
            .collect())
    }

    async fn describe_step(&self, _cluster: &ClusterHandle, step: &StepHandle) -> Result<Step> {
        self.record("describe_step")?;
        let state = Self::next(&self.step_states);
        let failure_details = state.is_failure().then(|| FailureDetails {
            reason: Some("Step failed".to_string()),
            message: None,
            log_file: None,
        });
        Ok(Step {
            id: step.clone(),
            name: "Spark Job".to_string(),
            status: StepStatus {
                state,
                failure_details,
            },
        })
    }

    async fn terminate_cluster(&self, _cluster: &ClusterHandle) -> Result<()> {
        self.record("terminate_cluster")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "cluster state script needs at least one state")]
    fn test_empty_cluster_script_rejected() {
        let _ = ScriptedClusterApi::new().cluster_states(&[]);
    }

    #[test]
    #[should_panic(expected = "step state script needs at least one state")]
    fn test_empty_step_script_rejected() {
        let _ = ScriptedClusterApi::new().step_states(&[]);
    }
}
