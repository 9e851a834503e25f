//! MCP server for read-only Kubernetes inspection.
//!
//! Exposes eight tools to AI agents:
//!
//! - **Pods**: `list-pods`, `get-pod`, `get-pod-logs`
//! - **Services**: `list-services`, `get-service`
//! - **Deployments**: `list-deployments`, `get-deployment`
//! - **Namespaces**: `list-namespaces`
//!
//! # Architecture
//!
//! Requests arrive as JSON-RPC 2.0 messages, one per line, on stdin. Tool calls
//! are routed by name to a handler that validates arguments, queries the
//! cluster through a [`ClusterClient`](cluster_client_interface::ClusterClient)
//! and answers with indented JSON text on stdout.

pub mod server;
pub mod tools;

pub use server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer, ServeError};
pub use server::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION,
};

// Re-export common types
pub use rmcp;
