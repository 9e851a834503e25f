//! MCP Server implementation for the Kubernetes bridge.
//!
//! This module provides the main MCP server that exposes read-only cluster
//! inspection to AI agents via the Model Context Protocol.

use std::future::Future;
use std::sync::Arc;

use rmcp::model::Implementation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn, Instrument};

use cluster_client_interface::ClusterClient;
use server_config::ServerSection;

use crate::tools::*;

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP Server for read-only Kubernetes inspection.
///
/// Every tool call is answered from the shared cluster client; the server
/// itself holds no mutable state.
pub struct McpServer<C>
where
    C: ClusterClient + ?Sized + 'static,
{
    client: Arc<C>,
    identity: ServerSection,
}

impl<C> Clone for McpServer<C>
where
    C: ClusterClient + ?Sized + 'static,
{
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            identity: self.identity.clone(),
        }
    }
}

impl<C> McpServer<C>
where
    C: ClusterClient + 'static,
{
    /// Create a new MCP server that owns its cluster client.
    pub fn new(client: C, identity: ServerSection) -> Self {
        Self::with_shared(Arc::new(client), identity)
    }
}

impl<C> McpServer<C>
where
    C: ClusterClient + ?Sized + 'static,
{
    /// Create a new MCP server around an already shared cluster client.
    pub fn with_shared(client: Arc<C>, identity: ServerSection) -> Self {
        Self { client, identity }
    }

    /// Get server info for MCP initialization.
    pub fn server_info(&self) -> Implementation {
        Implementation {
            name: self.identity.name.clone(),
            version: self.identity.version.clone(),
            title: None,
            website_url: None,
            icons: None,
        }
    }

    // === Tool Implementations ===

    /// Dispatch a tool call by name and return the text shown to the client.
    pub async fn call_tool(&self, name: &str, args: ToolArguments) -> Result<String, ToolError> {
        match name {
            LIST_PODS => {
                self.handle_list_pods(NamespaceInput::from_arguments(&args))
                    .await
            }
            GET_POD => {
                self.handle_get_pod(ResourceInput::from_arguments(&args, "pod")?)
                    .await
            }
            GET_POD_LOGS => {
                self.handle_get_pod_logs(PodLogsInput::from_arguments(&args)?)
                    .await
            }
            LIST_SERVICES => {
                self.handle_list_services(NamespaceInput::from_arguments(&args))
                    .await
            }
            GET_SERVICE => {
                self.handle_get_service(ResourceInput::from_arguments(&args, "service")?)
                    .await
            }
            LIST_DEPLOYMENTS => {
                self.handle_list_deployments(NamespaceInput::from_arguments(&args))
                    .await
            }
            GET_DEPLOYMENT => {
                self.handle_get_deployment(ResourceInput::from_arguments(&args, "deployment")?)
                    .await
            }
            LIST_NAMESPACES => self.handle_list_namespaces().await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    /// List pods in a namespace.
    async fn handle_list_pods(&self, input: NamespaceInput) -> Result<String, ToolError> {
        let namespace = input.namespace();
        let pods = self.client.list_pods(namespace).await.map_err(|e| {
            error!(namespace, error = %e, "Failed to list pods");
            ToolError::upstream("list pods", e)
        })?;

        Ok(format!(
            "Pods in namespace '{}':\n{}",
            namespace,
            to_pretty_json("pods", &pods)?
        ))
    }

    /// Get a single pod.
    async fn handle_get_pod(&self, input: ResourceInput) -> Result<String, ToolError> {
        let namespace = input.namespace();
        let pod = self
            .client
            .get_pod(namespace, &input.name)
            .await
            .map_err(|e| {
                error!(namespace, name = %input.name, error = %e, "Failed to get pod");
                ToolError::upstream("get pod", e)
            })?;

        Ok(format!(
            "Pod '{}' in namespace '{}':\n{}",
            input.name,
            namespace,
            to_pretty_json("pod", &pod)?
        ))
    }

    /// Read pod logs. The log text is passed through untouched.
    async fn handle_get_pod_logs(&self, input: PodLogsInput) -> Result<String, ToolError> {
        let namespace = input.namespace();
        let logs = self
            .client
            .get_pod_logs(namespace, &input.name, input.tail)
            .await
            .map_err(|e| {
                error!(namespace, name = %input.name, error = %e, "Failed to get pod logs");
                ToolError::upstream("get pod logs", e)
            })?;

        Ok(format!(
            "Logs for pod '{}' in namespace '{}':\n{}",
            input.name, namespace, logs
        ))
    }

    async fn handle_list_services(&self, input: NamespaceInput) -> Result<String, ToolError> {
        let namespace = input.namespace();
        let services = self.client.list_services(namespace).await.map_err(|e| {
            error!(namespace, error = %e, "Failed to list services");
            ToolError::upstream("list services", e)
        })?;

        Ok(format!(
            "Services in namespace '{}':\n{}",
            namespace,
            to_pretty_json("services", &services)?
        ))
    }

    async fn handle_get_service(&self, input: ResourceInput) -> Result<String, ToolError> {
        let namespace = input.namespace();
        let service = self
            .client
            .get_service(namespace, &input.name)
            .await
            .map_err(|e| {
                error!(namespace, name = %input.name, error = %e, "Failed to get service");
                ToolError::upstream("get service", e)
            })?;

        Ok(format!(
            "Service '{}' in namespace '{}':\n{}",
            input.name,
            namespace,
            to_pretty_json("service", &service)?
        ))
    }

    async fn handle_list_deployments(&self, input: NamespaceInput) -> Result<String, ToolError> {
        let namespace = input.namespace();
        let deployments = self.client.list_deployments(namespace).await.map_err(|e| {
            error!(namespace, error = %e, "Failed to list deployments");
            ToolError::upstream("list deployments", e)
        })?;

        Ok(format!(
            "Deployments in namespace '{}':\n{}",
            namespace,
            to_pretty_json("deployments", &deployments)?
        ))
    }

    async fn handle_get_deployment(&self, input: ResourceInput) -> Result<String, ToolError> {
        let namespace = input.namespace();
        let deployment = self
            .client
            .get_deployment(namespace, &input.name)
            .await
            .map_err(|e| {
                error!(namespace, name = %input.name, error = %e, "Failed to get deployment");
                ToolError::upstream("get deployment", e)
            })?;

        Ok(format!(
            "Deployment '{}' in namespace '{}':\n{}",
            input.name,
            namespace,
            to_pretty_json("deployment", &deployment)?
        ))
    }

    /// List all namespaces in the cluster.
    async fn handle_list_namespaces(&self) -> Result<String, ToolError> {
        let namespaces = self.client.list_namespaces().await.map_err(|e| {
            error!(error = %e, "Failed to list namespaces");
            ToolError::upstream("list namespaces", e)
        })?;

        Ok(format!(
            "Namespaces:\n{}",
            to_pretty_json("namespaces", &namespaces)?
        ))
    }
}

// ============================================================================
// JSON-RPC Types
// ============================================================================

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID; absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name
    pub method: String,
    /// Parameters (optional)
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID (null when the request could not be read)
    pub id: Option<Value>,
    /// Result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Failure of the stdio transport itself. Request-level problems never end up here.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("I/O error on stdio transport: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// MCP Protocol Implementation
// ============================================================================

impl<C> McpServer<C>
where
    C: ClusterClient + ?Sized + 'static,
{
    /// Handle an incoming JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, "Handling MCP request");

        match request.method.as_str() {
            // MCP Protocol Methods
            "initialize" => self.handle_initialize(request.id),
            "initialized" | "notifications/initialized" => self.handle_initialized(request.id),
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),

            // Tool Methods
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,

            // Resource Methods
            "resources/list" => {
                JsonRpcResponse::success(request.id, serde_json::json!({ "resources": [] }))
            }

            // Unknown method
            _ => {
                warn!(method = %request.method, "Unknown method");
                JsonRpcResponse::error(
                    request.id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                )
            }
        }
    }

    /// Handle initialize request. Client capabilities are not negotiated.
    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let server_info = self.server_info();
        let result = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": false
                },
                "resources": {
                    "subscribe": false,
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": server_info.name,
                "version": server_info.version
            }
        });

        info!(name = %server_info.name, version = %server_info.version, "MCP server initialized");
        JsonRpcResponse::success(id, result)
    }

    /// Handle initialized notification.
    fn handle_initialized(&self, id: Option<Value>) -> JsonRpcResponse {
        debug!("Client sent initialized notification");
        JsonRpcResponse::success(id, serde_json::json!({}))
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tool_defs = ToolDefinitions::all();
        let tools: Vec<Value> = tool_defs
            .tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        #[derive(Debug, Deserialize)]
        struct ToolCallParams {
            name: String,
            #[serde(default)]
            arguments: Value,
        }

        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                );
            }
        };

        let span = observability::tool_span!(params.name);
        let outcome = self
            .call_tool(&params.name, ToolArguments::new(params.arguments))
            .instrument(span)
            .await;

        match outcome {
            Ok(text) => {
                // Format result as MCP tool result
                let content = serde_json::json!([{
                    "type": "text",
                    "text": text
                }]);
                JsonRpcResponse::success(id, serde_json::json!({ "content": content }))
            }
            Err(e) => {
                debug!(tool = %params.name, error = %e, "Tool call failed");
                JsonRpcResponse::error(id, e.code(), e.to_string())
            }
        }
    }

    /// Decode one line from the client. Returns `None` when nothing should be written back.
    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                return Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = raw.get("id").cloned().filter(|v| !v.is_null());
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Malformed JSON-RPC request");
                return Some(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };

        let notification = request.is_notification();
        let response = self.handle_request(request).await;
        if notification {
            None
        } else {
            Some(response)
        }
    }

    /// Run the request loop until EOF on `reader` or until `shutdown` resolves.
    ///
    /// Requests are handled one at a time, in arrival order.
    pub async fn serve<R, W, F>(&self, reader: R, mut writer: W, shutdown: F) -> Result<(), ServeError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        tokio::pin!(shutdown);

        loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                read = reader.read_until(b'\n', &mut buf) => read?,
            };

            if read == 0 {
                debug!("Client closed input");
                break;
            }

            // Undecodable bytes are a parse error for that line only.
            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    debug!(request = %line, "Received request");
                    self.handle_line(line).await
                }
                Err(e) => {
                    error!(error = %e, "Request is not valid UTF-8");
                    Some(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            if let Some(response) = response {
                let response_json = serde_json::to_string(&response)?;
                debug!(response = %response_json, "Sending response");

                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("MCP server shutdown");
        Ok(())
    }

    /// Run the MCP server over stdio.
    pub async fn serve_stdio<F>(&self, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()>,
    {
        info!("MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout(), shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_shared_types::{
        BridgeError, DeploymentInfo, NamespaceInfo, PodInfo, Result as BridgeResult, ServiceInfo,
    };

    // Cluster with nothing in it
    struct EmptyCluster;

    #[async_trait::async_trait]
    impl ClusterClient for EmptyCluster {
        async fn list_pods(&self, _: &str) -> BridgeResult<Vec<PodInfo>> {
            Ok(vec![])
        }
        async fn get_pod(&self, namespace: &str, name: &str) -> BridgeResult<PodInfo> {
            Err(BridgeError::NotFound {
                kind: "pod",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
        }
        async fn get_pod_logs(&self, _: &str, _: &str, _: Option<i64>) -> BridgeResult<String> {
            Ok(String::new())
        }
        async fn list_services(&self, _: &str) -> BridgeResult<Vec<ServiceInfo>> {
            Ok(vec![])
        }
        async fn get_service(&self, _: &str, _: &str) -> BridgeResult<ServiceInfo> {
            Err(BridgeError::api("get service", "connection refused"))
        }
        async fn list_deployments(&self, _: &str) -> BridgeResult<Vec<DeploymentInfo>> {
            Ok(vec![])
        }
        async fn get_deployment(&self, _: &str, _: &str) -> BridgeResult<DeploymentInfo> {
            Err(BridgeError::api("get deployment", "connection refused"))
        }
        async fn list_namespaces(&self) -> BridgeResult<Vec<NamespaceInfo>> {
            Ok(vec![])
        }
    }

    fn server() -> McpServer<EmptyCluster> {
        McpServer::new(EmptyCluster, ServerSection::default())
    }

    #[test]
    fn test_server_info() {
        let info = server().server_info();
        assert_eq!(info.name, "k8s-mcp-server");
        assert_eq!(info.version, "2.0.0");
        assert!(info.title.is_none());
    }

    #[test]
    fn test_server_info_uses_configured_identity() {
        let identity = ServerSection {
            name: "prod-inspector".to_string(),
            version: "9.9.9".to_string(),
        };
        let info = McpServer::new(EmptyCluster, identity).server_info();
        assert_eq!(info.name, "prod-inspector");
        assert_eq!(info.version, "9.9.9");
    }

    #[test]
    fn test_server_over_trait_object() {
        let shared: Arc<dyn ClusterClient> = Arc::new(EmptyCluster);
        let server = McpServer::with_shared(shared, ServerSection::default());
        let _clone = server.clone();
    }

    #[tokio::test]
    async fn test_empty_namespace_lists_as_empty_array() {
        let text = server()
            .call_tool(LIST_PODS, ToolArguments::default())
            .await
            .unwrap();
        assert_eq!(text, "Pods in namespace 'default':\n[]");
    }

    #[tokio::test]
    async fn test_empty_logs_keep_preamble() {
        let text = server()
            .call_tool(GET_POD_LOGS, serde_json::json!({"name": "web-0"}).into())
            .await
            .unwrap();
        assert_eq!(text, "Logs for pod 'web-0' in namespace 'default':\n");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = server()
            .call_tool("delete-pod", ToolArguments::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), METHOD_NOT_FOUND);
        assert_eq!(err.to_string(), "Unknown tool: delete-pod");
    }

    #[tokio::test]
    async fn test_missing_params_on_tools_call() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(serde_json::json!(1)),
            method: "tools/call".to_string(),
            params: Value::Null,
        };
        let response = server().handle_request(request).await;
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_line_without_method_is_invalid_request() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":7}"#)
            .await
            .unwrap();
        assert_eq!(response.id, Some(serde_json::json!(7)));
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_notification_gets_no_reply() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }
}
