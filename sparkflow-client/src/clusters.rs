//! Cluster-related API endpoints

use crate::HttpClusterClient;
use crate::error::Result;
use sparkflow_core::domain::cluster::Cluster;
use sparkflow_core::domain::definition::ClusterDefinition;
use sparkflow_core::domain::handle::ClusterHandle;
use sparkflow_core::dto::cluster::{CreateClusterResponse, DescribeClusterResponse};
use tracing::debug;

impl HttpClusterClient {
    // =============================================================================
    // Cluster Lifecycle
    // =============================================================================

    /// Provision a new cluster
    ///
    /// # Arguments
    /// * `definition` - Cluster shape, applications and roles
    ///
    /// # Returns
    /// The handle of the new cluster
    pub async fn create_cluster(&self, definition: &ClusterDefinition) -> Result<ClusterHandle> {
        let url = format!("{}/clusters", self.base_url);
        debug!("Creating cluster '{}'", definition.name);
        let response = self.client.post(&url).json(definition).send().await?;

        let created: CreateClusterResponse = self.handle_response(response).await?;
        Ok(created.cluster_id)
    }

    /// Describe a cluster by handle
    pub async fn describe_cluster(&self, cluster: &ClusterHandle) -> Result<Cluster> {
        let url = format!("{}/clusters/{}", self.base_url, cluster);
        let response = self.client.get(&url).send().await?;

        let described: DescribeClusterResponse = self.handle_response(response).await?;
        Ok(described.cluster)
    }

    /// Request termination of a cluster
    pub async fn terminate_cluster(&self, cluster: &ClusterHandle) -> Result<()> {
        let url = format!("{}/clusters/{}", self.base_url, cluster);
        debug!("Terminating cluster {}", cluster);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
