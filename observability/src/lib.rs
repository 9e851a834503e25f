//! Logging for the k8s MCP server.
//!
//! All output goes to stderr: stdout carries MCP protocol frames and must
//! never receive log lines.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, level_for, TracingConfig};
