use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub type Labels = BTreeMap<String, String>;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to connect to cluster: {0}")]
    Connect(String),
    #[error("{kind} {name} not found in namespace {namespace}")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },
    #[error("failed to {operation}: {message}")]
    Api { operation: String, message: String },
    #[error("failed to get logs for pod {name} in namespace {namespace}: {message}")]
    Logs {
        namespace: String,
        name: String,
        message: String,
    },
    #[error("{kind} {name} is missing required field {field}")]
    MissingField {
        kind: &'static str,
        name: String,
        field: &'static str,
    },
}

impl BridgeError {
    pub fn api(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

// Compact projection of a Pod
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub ready: String, // "<ready>/<total>" container statuses
    pub restarts: i32,
    pub age: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pod_ip: String,
}

// Compact projection of a Service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub cluster_ip: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_ips: Vec<String>, // load balancer IPs and hostnames
    pub ports: Vec<String>,        // e.g. "80/TCP" or "80/TCP:30080"
    pub age: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: Labels,
}

// Compact projection of a Deployment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub ready: String, // "<ready replicas>/<desired replicas>"
    pub up_to_date: i32,
    pub available: i32,
    pub age: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    pub replicas: i32,
}

// Compact projection of a Namespace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub name: String,
    pub status: String,
    pub age: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}
