//! Typed tool inputs.
//!
//! These structs double as the source of each tool's JSON input schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::arguments::{resolve_namespace, ToolArguments};
use super::ToolError;

/// Input for tools that operate on a whole namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NamespaceInput {
    /// Kubernetes namespace (default: default)
    #[serde(default)]
    pub namespace: Option<String>,
}

impl NamespaceInput {
    pub fn from_arguments(args: &ToolArguments) -> Self {
        Self {
            namespace: args.string("namespace"),
        }
    }

    pub fn namespace(&self) -> &str {
        resolve_namespace(self.namespace.as_deref())
    }
}

/// Input for tools that read a single named resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceInput {
    /// Resource name
    pub name: String,
    /// Kubernetes namespace (default: default)
    #[serde(default)]
    pub namespace: Option<String>,
}

impl ResourceInput {
    /// `kind` only feeds the error message, e.g. "pod name is required".
    pub fn from_arguments(args: &ToolArguments, kind: &str) -> Result<Self, ToolError> {
        let name = args
            .non_empty_string("name")
            .ok_or_else(|| ToolError::MissingArgument(format!("{} name is required", kind)))?;

        Ok(Self {
            name,
            namespace: args.string("namespace"),
        })
    }

    pub fn namespace(&self) -> &str {
        resolve_namespace(self.namespace.as_deref())
    }
}

/// Input for reading pod logs
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PodLogsInput {
    /// Pod name
    pub name: String,
    /// Kubernetes namespace (default: default)
    #[serde(default)]
    pub namespace: Option<String>,
    /// Number of lines to tail from the end of the log
    #[serde(default)]
    pub tail: Option<i64>,
}

impl PodLogsInput {
    pub fn from_arguments(args: &ToolArguments) -> Result<Self, ToolError> {
        let ResourceInput { name, namespace } = ResourceInput::from_arguments(args, "pod")?;

        Ok(Self {
            name,
            namespace,
            tail: args.lenient_integer("tail"),
        })
    }

    pub fn namespace(&self) -> &str {
        resolve_namespace(self.namespace.as_deref())
    }
}

/// `list-namespaces` takes no arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListNamespacesInput {}
