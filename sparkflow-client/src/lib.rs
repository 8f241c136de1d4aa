//! Sparkflow HTTP Client
//!
//! A small, type-safe client for the cluster-management API.
//!
//! The [`ClusterApi`] trait is what the rest of Sparkflow depends on;
//! [`HttpClusterClient`] is its HTTP/JSON implementation.
//!
//! # Example
//!
//! ```no_run
//! use sparkflow_client::{ClusterApi, HttpClusterClient};
//! use sparkflow_core::domain::handle::ClusterHandle;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpClusterClient::new("http://localhost:8080");
//!     let handle = ClusterHandle::new("j-2AXXXXXXGAPLF")?;
//!
//!     let cluster = client.describe_cluster(&handle).await?;
//!     println!("{} is {}", cluster.id, cluster.status.state);
//!     Ok(())
//! }
//! ```

pub mod api;
mod clusters;
pub mod error;
mod steps;

// Re-export commonly used types
pub use api::ClusterApi;
pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use sparkflow_core::domain::cluster::Cluster;
use sparkflow_core::domain::definition::{ClusterDefinition, StepDefinition};
use sparkflow_core::domain::handle::{ClusterHandle, StepHandle};
use sparkflow_core::domain::step::Step;

/// HTTP client for the cluster-management API
///
/// Endpoints, relative to the base URL:
/// - `POST /clusters` create a cluster
/// - `GET /clusters/{id}` describe a cluster
/// - `DELETE /clusters/{id}` terminate a cluster
/// - `POST /clusters/{id}/steps` add steps
/// - `GET /clusters/{id}/steps/{step}` describe a step
#[derive(Debug, Clone)]
pub struct HttpClusterClient {
    /// Base URL of the API (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl HttpClusterClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use sparkflow_client::HttpClusterClient;
    ///
    /// let client = HttpClusterClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response without a body
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[async_trait]
impl ClusterApi for HttpClusterClient {
    async fn create_cluster(&self, definition: &ClusterDefinition) -> Result<ClusterHandle> {
        HttpClusterClient::create_cluster(self, definition).await
    }

    async fn describe_cluster(&self, cluster: &ClusterHandle) -> Result<Cluster> {
        HttpClusterClient::describe_cluster(self, cluster).await
    }

    async fn add_steps(
        &self,
        cluster: &ClusterHandle,
        steps: &[StepDefinition],
    ) -> Result<Vec<StepHandle>> {
        HttpClusterClient::add_steps(self, cluster, steps).await
    }

    async fn describe_step(&self, cluster: &ClusterHandle, step: &StepHandle) -> Result<Step> {
        HttpClusterClient::describe_step(self, cluster, step).await
    }

    async fn terminate_cluster(&self, cluster: &ClusterHandle) -> Result<()> {
        HttpClusterClient::terminate_cluster(self, cluster).await
    }
}
