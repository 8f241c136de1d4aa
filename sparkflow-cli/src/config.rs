//! Configuration module
//!
//! Handles CLI configuration shared by every command.

use std::sync::Arc;

use sparkflow_client::{ClusterApi, HttpClusterClient};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the cluster-management API
    pub api_url: String,
}

impl Config {
    /// Builds the API client every command talks through
    pub fn client(&self) -> Arc<dyn ClusterApi> {
        Arc::new(HttpClusterClient::new(self.api_url.clone()))
    }
}
