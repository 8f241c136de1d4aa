//! Cluster domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::handle::ClusterHandle;

/// Cluster lifecycle state as reported by the cluster-management API
///
/// Unrecognised strings are kept in [`ClusterState::Unknown`] so a provider
/// adding new states does not break deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClusterState {
    Starting,
    Bootstrapping,
    Running,
    Waiting,
    Terminating,
    Terminated,
    TerminatedWithErrors,
    Unknown(String),
}

impl ClusterState {
    /// Wire representation of the state
    pub fn as_str(&self) -> &str {
        match self {
            ClusterState::Starting => "STARTING",
            ClusterState::Bootstrapping => "BOOTSTRAPPING",
            ClusterState::Running => "RUNNING",
            ClusterState::Waiting => "WAITING",
            ClusterState::Terminating => "TERMINATING",
            ClusterState::Terminated => "TERMINATED",
            ClusterState::TerminatedWithErrors => "TERMINATED_WITH_ERRORS",
            ClusterState::Unknown(raw) => raw,
        }
    }

    /// Idle and able to accept step submissions
    pub fn is_ready(&self) -> bool {
        matches!(self, ClusterState::Waiting)
    }
}

impl From<String> for ClusterState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "STARTING" => ClusterState::Starting,
            "BOOTSTRAPPING" => ClusterState::Bootstrapping,
            "RUNNING" => ClusterState::Running,
            "WAITING" => ClusterState::Waiting,
            "TERMINATING" => ClusterState::Terminating,
            "TERMINATED" => ClusterState::Terminated,
            "TERMINATED_WITH_ERRORS" => ClusterState::TerminatedWithErrors,
            _ => ClusterState::Unknown(raw),
        }
    }
}

impl From<&str> for ClusterState {
    fn from(raw: &str) -> Self {
        ClusterState::from(raw.to_string())
    }
}

impl From<ClusterState> for String {
    fn from(state: ClusterState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the cluster last changed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct StateChangeReason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Current cluster status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterStatus {
    pub state: ClusterState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change_reason: Option<StateChangeReason>,
}

/// Cluster description returned by "describe cluster"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cluster {
    pub id: ClusterHandle,
    #[serde(default)]
    pub name: String,
    pub status: ClusterStatus,
}
