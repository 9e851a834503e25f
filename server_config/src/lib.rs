//! Server configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `SERVER_NAME` | `k8s-mcp-server` |
//! | `SERVER_VERSION` | `2.0.0` |
//! | `KUBECONFIG` | `~/.kube/config` |
//! | `K8S_IN_CLUSTER` | `false` |
//! | `LOG_LEVEL` | `info` |
//! | `LOG_FORMAT` | `text` |
//!
//! The configuration is read once at startup and never mutated.

pub mod config;
pub mod error;

pub use config::{
    KubernetesSection, LogFormat, LogLevel, LoggingSection, ServerConfig, ServerSection,
    DEFAULT_SERVER_NAME, DEFAULT_SERVER_VERSION,
};
pub use error::{ConfigError, Result};
