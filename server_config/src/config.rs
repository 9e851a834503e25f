//! Typed server configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_SERVER_NAME: &str = "k8s-mcp-server";
pub const DEFAULT_SERVER_VERSION: &str = "2.0.0";

const ENV_SERVER_NAME: &str = "SERVER_NAME";
const ENV_SERVER_VERSION: &str = "SERVER_VERSION";
const ENV_KUBECONFIG: &str = "KUBECONFIG";
const ENV_IN_CLUSTER: &str = "K8S_IN_CLUSTER";
const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub kubernetes: KubernetesSection,
    pub logging: LoggingSection,
}

/// Identity reported to MCP clients during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    pub name: String,
    pub version: String,
}

/// How to reach the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KubernetesSection {
    /// Use the service account mounted into the pod.
    pub in_cluster: bool,
    /// Kubeconfig file used when not running in-cluster.
    pub kubeconfig: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: DEFAULT_SERVER_VERSION.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            kubernetes: KubernetesSection {
                in_cluster: false,
                kubeconfig: default_kubeconfig_path(),
            },
            logging: LoggingSection::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerSection {
            name: get(ENV_SERVER_NAME).unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            version: get(ENV_SERVER_VERSION).unwrap_or_else(|| DEFAULT_SERVER_VERSION.to_string()),
        };

        let in_cluster = match get(ENV_IN_CLUSTER) {
            Some(raw) => parse_bool(ENV_IN_CLUSTER, &raw)?,
            None => false,
        };
        let kubeconfig = get(ENV_KUBECONFIG)
            .map(PathBuf::from)
            .or_else(default_kubeconfig_path);

        let level = match get(ENV_LOG_LEVEL) {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };
        let format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            server,
            kubernetes: KubernetesSection {
                in_cluster,
                kubeconfig,
            },
            logging: LoggingSection { level, format },
        })
    }
}

/// `~/.kube/config`, if a home directory can be determined.
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(var, raw, "true or false")),
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::invalid(
                ENV_LOG_LEVEL,
                s,
                "one of trace, debug, info, warn, error",
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::invalid(ENV_LOG_FORMAT, s, "text or json")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}
