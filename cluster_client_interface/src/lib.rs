use async_trait::async_trait;
use k8s_shared_types::{DeploymentInfo, NamespaceInfo, PodInfo, Result, ServiceInfo};

/// Namespace used when a caller does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Read-only view of a Kubernetes cluster.
///
/// List operations return records in the order the API server returned them.
/// Single-resource lookups fail with `BridgeError::NotFound` when the object
/// does not exist.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>>;
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodInfo>;
    /// Read the whole log of a pod, optionally limited to the last `tail_lines` lines.
    async fn get_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        tail_lines: Option<i64>,
    ) -> Result<String>;

    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>>;
    async fn get_service(&self, namespace: &str, name: &str) -> Result<ServiceInfo>;

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>>;
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<DeploymentInfo>;

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>>;
}
