//! Kubernetes implementation of [`ClusterClient`].
//!
//! Objects returned by the API server are projected into the compact display
//! records from `k8s_shared_types`; nothing is cached and nothing is written.

pub mod kube_client;
pub mod projection;

pub use cluster_client_interface::{ClusterClient, DEFAULT_NAMESPACE};
pub use kube_client::KubeClusterClient;
pub use projection::format_age;
