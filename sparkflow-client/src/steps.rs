//! Step-related API endpoints

use crate::HttpClusterClient;
use crate::error::{ClientError, Result};
use sparkflow_core::domain::definition::StepDefinition;
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use sparkflow_core::domain::step::Step;
use sparkflow_core::dto::step::{AddStepsRequest, AddStepsResponse, DescribeStepResponse};

impl HttpClusterClient {
    // =============================================================================
    // Steps
    // =============================================================================

    /// Submit steps to a running cluster
    ///
    /// # Returns
    /// One handle per submitted step, in submission order
    pub async fn add_steps(
        &self,
        cluster: &ClusterHandle,
        steps: &[StepDefinition],
    ) -> Result<Vec<StepHandle>> {
        let url = format!("{}/clusters/{}/steps", self.base_url, cluster);
        let response = self
            .client
            .post(&url)
            .json(&AddStepsRequest {
                steps: steps.to_vec(),
            })
            .send()
            .await?;

        let added: AddStepsResponse = self.handle_response(response).await?;
        if added.step_ids.len() != steps.len() {
            return Err(ClientError::InvalidResponse(format!(
                "submitted {} step(s) but received {} id(s)",
                steps.len(),
                added.step_ids.len()
            )));
        }

        Ok(added.step_ids)
    }

    /// Describe a step on a cluster
    pub async fn describe_step(&self, cluster: &ClusterHandle, step: &StepHandle) -> Result<Step> {
        let url = format!("{}/clusters/{}/steps/{}", self.base_url, cluster, step);
        let response = self.client.get(&url).send().await?;

        let described: DescribeStepResponse = self.handle_response(response).await?;
        Ok(described.step)
    }
}
