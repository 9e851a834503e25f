//! `ClusterClient` backed by kube-rs.

use async_trait::async_trait;
use chrono::Utc;
use futures_util::io::{AsyncBufRead, AsyncReadExt};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use kube::api::{ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use tracing::{debug, info};

use cluster_client_interface::ClusterClient;
use k8s_shared_types::{
    BridgeError, DeploymentInfo, NamespaceInfo, PodInfo, Result, ServiceInfo,
};
use server_config::KubernetesSection;

use crate::projection::{deployment_info, namespace_info, pod_info, service_info};

/// Read-only cluster access through the Kubernetes API server.
///
/// Cloning is cheap; clones share the underlying HTTP client.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Authenticate using either the in-cluster service account or a kubeconfig file.
    pub async fn connect(settings: &KubernetesSection) -> Result<Self> {
        let config = build_config(settings).await?;
        info!(cluster_url = %config.cluster_url, in_cluster = settings.in_cluster, "Connecting to cluster");

        let client = Client::try_from(config)
            .map_err(|e| BridgeError::Connect(format!("failed to create kubernetes client: {}", e)))?;
        Ok(Self { client })
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

async fn build_config(settings: &KubernetesSection) -> Result<Config> {
    if settings.in_cluster {
        return Config::incluster().map_err(|e| {
            BridgeError::Connect(format!("in-cluster configuration unavailable: {}", e))
        });
    }

    let path = settings.kubeconfig.as_ref().ok_or_else(|| {
        BridgeError::Config("kubeconfig path is required when not running in cluster".to_string())
    })?;

    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        BridgeError::Config(format!("failed to read kubeconfig {}: {}", path.display(), e))
    })?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| BridgeError::Connect(format!("failed to build kubernetes config: {}", e)))
}

/// A 404 from the API server becomes `NotFound`; everything else is wrapped with context.
fn lookup_error(kind: &'static str, namespace: &str, name: &str, err: kube::Error) -> BridgeError {
    match err {
        kube::Error::Api(response) if response.code == 404 => BridgeError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => BridgeError::api(
            format!("get {} {} in namespace {}", kind, name, namespace),
            other,
        ),
    }
}

/// Like `lookup_error`, but failures other than 404 are reported as log read errors.
fn log_error(namespace: &str, name: &str, err: kube::Error) -> BridgeError {
    match err {
        kube::Error::Api(response) if response.code == 404 => BridgeError::NotFound {
            kind: "pod",
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => BridgeError::Logs {
            namespace: namespace.to_string(),
            name: name.to_string(),
            message: other.to_string(),
        },
    }
}

/// Drain a log stream to EOF. Container output is not guaranteed to be UTF-8,
/// so invalid sequences are replaced rather than failing the read.
async fn read_log_stream<R: AsyncBufRead>(stream: R) -> std::io::Result<String> {
    let mut stream = std::pin::pin!(stream);
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>> {
        debug!(namespace, "Listing pods");
        let pods = self
            .namespaced::<Pod>(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| BridgeError::api(format!("list pods in namespace {}", namespace), e))?;

        let now = Utc::now();
        Ok(pods.iter().map(|pod| pod_info(pod, now)).collect())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodInfo> {
        debug!(namespace, name, "Getting pod");
        let pod = self
            .namespaced::<Pod>(namespace)
            .get(name)
            .await
            .map_err(|e| lookup_error("pod", namespace, name, e))?;

        Ok(pod_info(&pod, Utc::now()))
    }

    async fn get_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        tail_lines: Option<i64>,
    ) -> Result<String> {
        debug!(namespace, name, ?tail_lines, "Reading pod logs");
        let params = LogParams {
            tail_lines,
            ..LogParams::default()
        };

        let stream = self
            .namespaced::<Pod>(namespace)
            .log_stream(name, &params)
            .await
            .map_err(|e| log_error(namespace, name, e))?;

        read_log_stream(stream).await.map_err(|e| BridgeError::Logs {
            namespace: namespace.to_string(),
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>> {
        debug!(namespace, "Listing services");
        let services = self
            .namespaced::<Service>(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| BridgeError::api(format!("list services in namespace {}", namespace), e))?;

        let now = Utc::now();
        Ok(services.iter().map(|svc| service_info(svc, now)).collect())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<ServiceInfo> {
        debug!(namespace, name, "Getting service");
        let service = self
            .namespaced::<Service>(namespace)
            .get(name)
            .await
            .map_err(|e| lookup_error("service", namespace, name, e))?;

        Ok(service_info(&service, Utc::now()))
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>> {
        debug!(namespace, "Listing deployments");
        let deployments = self
            .namespaced::<Deployment>(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| {
                BridgeError::api(format!("list deployments in namespace {}", namespace), e)
            })?;

        let now = Utc::now();
        deployments
            .iter()
            .map(|deployment| deployment_info(deployment, now))
            .collect()
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<DeploymentInfo> {
        debug!(namespace, name, "Getting deployment");
        let deployment = self
            .namespaced::<Deployment>(namespace)
            .get(name)
            .await
            .map_err(|e| lookup_error("deployment", namespace, name, e))?;

        deployment_info(&deployment, Utc::now())
    }

    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>> {
        debug!("Listing namespaces");
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .map_err(|e| BridgeError::api("list namespaces", e))?;

        let now = Utc::now();
        Ok(list.iter().map(|ns| namespace_info(ns, now)).collect())
    }
}
