//! MCP tools for cluster inspection.
//!
//! The catalog is fixed: tools are never added or removed at runtime, which
//! is why the server advertises `listChanged: false`.

pub mod arguments;
pub mod inputs;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use k8s_shared_types::BridgeError;

use crate::server::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};

pub use arguments::ToolArguments;
pub use inputs::*;

pub const LIST_PODS: &str = "list-pods";
pub const GET_POD: &str = "get-pod";
pub const GET_POD_LOGS: &str = "get-pod-logs";
pub const LIST_SERVICES: &str = "list-services";
pub const GET_SERVICE: &str = "get-service";
pub const LIST_DEPLOYMENTS: &str = "list-deployments";
pub const GET_DEPLOYMENT: &str = "get-deployment";
pub const LIST_NAMESPACES: &str = "list-namespaces";

/// Why a tool call failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required argument was absent or empty; nothing was sent to the cluster.
    #[error("{0}")]
    MissingArgument(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("failed to {operation}: {source}")]
    Upstream {
        operation: &'static str,
        source: BridgeError,
    },

    #[error("failed to marshal {what}: {source}")]
    Serialization {
        what: &'static str,
        source: serde_json::Error,
    },
}

impl ToolError {
    pub fn upstream(operation: &'static str, source: BridgeError) -> Self {
        Self::Upstream { operation, source }
    }

    /// JSON-RPC error code reported to the client.
    pub fn code(&self) -> i32 {
        match self {
            Self::MissingArgument(_) => INVALID_PARAMS,
            Self::UnknownTool(_) => METHOD_NOT_FOUND,
            Self::Upstream { .. } | Self::Serialization { .. } => INTERNAL_ERROR,
        }
    }
}

/// Render a display record (or list of them) as two-space indented JSON.
pub fn to_pretty_json<T: Serialize>(what: &'static str, value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|source| ToolError::Serialization { what, source })
}

/// Tool definitions for the MCP server.
#[derive(Debug, Clone)]
pub struct ToolDefinitions {
    /// Available tools
    pub tools: Vec<ToolInfo>,
}

/// Information about a single tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input schema (JSON Schema)
    pub input_schema: Value,
}

impl ToolInfo {
    fn new<T: JsonSchema>(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default(),
        }
    }
}

impl ToolDefinitions {
    /// Get all available tool definitions.
    pub fn all() -> Self {
        Self {
            tools: vec![
                ToolInfo::new::<NamespaceInput>(LIST_PODS, "List pods in a namespace"),
                ToolInfo::new::<ResourceInput>(
                    GET_POD,
                    "Get detailed information about a specific pod",
                ),
                ToolInfo::new::<PodLogsInput>(GET_POD_LOGS, "Get logs from a specific pod"),
                ToolInfo::new::<NamespaceInput>(LIST_SERVICES, "List services in a namespace"),
                ToolInfo::new::<ResourceInput>(
                    GET_SERVICE,
                    "Get detailed information about a specific service",
                ),
                ToolInfo::new::<NamespaceInput>(
                    LIST_DEPLOYMENTS,
                    "List deployments in a namespace",
                ),
                ToolInfo::new::<ResourceInput>(
                    GET_DEPLOYMENT,
                    "Get detailed information about a specific deployment",
                ),
                ToolInfo::new::<ListNamespacesInput>(
                    LIST_NAMESPACES,
                    "List all namespaces in the cluster",
                ),
            ],
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}
