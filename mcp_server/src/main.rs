//! MCP Server binary for read-only Kubernetes inspection.
//!
//! # Usage
//!
//! Run with stdio transport:
//! ```bash
//! KUBECONFIG=~/.kube/config k8s-mcp-server
//! ```
//!
//! Inside a pod, set `K8S_IN_CLUSTER=true` to use the service account.

use std::process::exit;

use anyhow::Context;
use tracing::{error, info};

use cluster_client::KubeClusterClient;
use mcp_server::tools::ToolDefinitions;
use mcp_server::McpServer;
use observability::{init_tracing, TracingConfig};
use server_config::ServerConfig;

/// Main entry point for the MCP server.
#[tokio::main]
async fn main() {
    // Logging is not up yet, so a bad environment is reported on stderr directly
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            exit(1);
        }
    };

    init_tracing(TracingConfig::from_logging(
        config.server.name.clone(),
        &config.logging,
    ));

    info!(
        name = %config.server.name,
        version = %config.server.version,
        "Starting Kubernetes MCP server"
    );

    if let Err(e) = run(config).await {
        error!("Server error: {:#}", e);
        exit(1);
    }

    info!("Server shutdown gracefully");
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let client = KubeClusterClient::connect(&config.kubernetes)
        .await
        .context("Failed to create Kubernetes client")?;

    let server = McpServer::new(client, config.server);

    let tools = ToolDefinitions::all();
    info!(tools = ?tools.names(), "Available tools");

    server
        .serve_stdio(shutdown_signal())
        .await
        .context("MCP transport failed")?;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
