//! Step DTOs

use serde::{Deserialize, Serialize};

use crate::domain::definition::StepDefinition;
use crate::domain::handle::StepHandle;
use crate::domain::step::Step;

/// Request to add steps to a running cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddStepsRequest {
    pub steps: Vec<StepDefinition>,
}

/// Identifiers of the submitted steps, in submission order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddStepsResponse {
    pub step_ids: Vec<StepHandle>,
}

/// Response to "describe step"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeStepResponse {
    pub step: Step,
}
