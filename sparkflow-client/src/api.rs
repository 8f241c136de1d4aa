//! Cluster-management API abstraction
//!
//! Everything that talks to the external cluster service goes through
//! [`ClusterApi`]. Callers receive an explicitly constructed implementation
//! (usually `Arc<dyn ClusterApi>`) instead of reaching for a shared global
//! client, which also lets tests substitute a scripted fake.

use async_trait::async_trait;
use sparkflow_core::domain::cluster::Cluster;
use sparkflow_core::domain::definition::{ClusterDefinition, StepDefinition};
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use sparkflow_core::domain::step::Step;

use crate::error::Result;

#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Provisions a new cluster and returns its handle
    ///
    /// Returns as soon as the request is accepted; the cluster is usually
    /// still `STARTING`.
    async fn create_cluster(&self, definition: &ClusterDefinition) -> Result<ClusterHandle>;

    /// Describes a cluster, including its current state
    async fn describe_cluster(&self, cluster: &ClusterHandle) -> Result<Cluster>;

    /// Submits steps to a cluster
    ///
    /// Returns step handles in submission order.
    async fn add_steps(
        &self,
        cluster: &ClusterHandle,
        steps: &[StepDefinition],
    ) -> Result<Vec<StepHandle>>;

    /// Describes a single step
    async fn describe_step(&self, cluster: &ClusterHandle, step: &StepHandle) -> Result<Step>;

    /// Requests cluster termination
    async fn terminate_cluster(&self, cluster: &ClusterHandle) -> Result<()>;
}
