//! Cluster DTOs

use serde::{Deserialize, Serialize};

use crate::domain::cluster::Cluster;
use crate::domain::handle::ClusterHandle;

/// Response to a cluster creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateClusterResponse {
    pub cluster_id: ClusterHandle,
}

/// Response to "describe cluster"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeClusterResponse {
    pub cluster: Cluster,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::ClusterState;

    #[test]
    fn test_describe_cluster_envelope() {
        let json = r#"{"Cluster": {"Id": "j-1", "Status": {"State": "BOOTSTRAPPING"}}}"#;
        let response: DescribeClusterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.cluster.status.state, ClusterState::Bootstrapping);
        assert!(response.cluster.name.is_empty());
    }

    #[test]
    fn test_create_cluster_rejects_empty_id() {
        let result = serde_json::from_str::<CreateClusterResponse>(r#"{"ClusterId": ""}"#);
        assert!(result.is_err());
    }
}
