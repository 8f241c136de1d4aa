//! Step domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use super::handle::StepHandle;

/// Step lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepState {
    Pending,
    CancelPending,
    Running,
    Completed,
    Cancelled,
    Failed,
    Interrupted,
    Unknown(String),
}

impl StepState {
    pub fn as_str(&self) -> &str {
        match self {
            StepState::Pending => "PENDING",
            StepState::CancelPending => "CANCEL_PENDING",
            StepState::Running => "RUNNING",
            StepState::Completed => "COMPLETED",
            StepState::Cancelled => "CANCELLED",
            StepState::Failed => "FAILED",
            StepState::Interrupted => "INTERRUPTED",
            StepState::Unknown(raw) => raw,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepState::Completed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepState::Cancelled | StepState::Failed | StepState::Interrupted
        )
    }
}

impl From<String> for StepState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING" => StepState::Pending,
            "CANCEL_PENDING" => StepState::CancelPending,
            "RUNNING" => StepState::Running,
            "COMPLETED" => StepState::Completed,
            "CANCELLED" => StepState::Cancelled,
            "FAILED" => StepState::Failed,
            "INTERRUPTED" => StepState::Interrupted,
            _ => StepState::Unknown(raw),
        }
    }
}

impl From<&str> for StepState {
    fn from(raw: &str) -> Self {
        StepState::from(raw.to_string())
    }
}

impl From<StepState> for String {
    fn from(state: StepState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details reported for a failed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct FailureDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl FailureDetails {
    /// One-line summary suitable for error messages
    pub fn summary(&self) -> String {
        match (&self.reason, &self.message) {
            (Some(reason), Some(message)) => format!("{}: {}", reason, message),
            (Some(reason), None) => reason.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "no failure details reported".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StepStatus {
    pub state: StepState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_details: Option<FailureDetails>,
}

/// Step description returned by "describe step"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Step {
    pub id: StepHandle,
    #[serde(default)]
    pub name: String,
    pub status: StepStatus,
}
