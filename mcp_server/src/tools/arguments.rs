//! Loose extraction of tool-call arguments.
//!
//! MCP clients are not consistent about argument types, so values are read
//! from the raw JSON object instead of being deserialized strictly.

use serde_json::{Map, Value};

use cluster_client_interface::DEFAULT_NAMESPACE;

/// The `arguments` object of a `tools/call` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Anything other than a JSON object is treated as no arguments.
    pub fn new(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// A string argument; non-string values count as absent.
    pub fn string(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(Value::as_str).map(str::to_string)
    }

    /// A non-empty string argument.
    pub fn non_empty_string(&self, key: &str) -> Option<String> {
        self.string(key).filter(|s| !s.is_empty())
    }

    /// An integer given as a JSON integer, a JSON float, or a numeric string.
    pub fn lenient_integer(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(lenient_integer)
    }
}

impl From<Value> for ToolArguments {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Floats are truncated toward zero. Unparseable values yield `None`.
pub fn lenient_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// `None` and `""` both mean the default namespace.
pub fn resolve_namespace(namespace: Option<&str>) -> &str {
    match namespace {
        Some(ns) if !ns.is_empty() => ns,
        _ => DEFAULT_NAMESPACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_namespace_defaults() {
        assert_eq!(resolve_namespace(None), "default");
        assert_eq!(resolve_namespace(Some("")), "default");
        assert_eq!(resolve_namespace(Some("kube-system")), "kube-system");
    }

    #[test]
    fn test_tail_accepts_integer_float_and_string() {
        for raw in [json!(50), json!(50.0), json!(50.9), json!("50"), json!(" 50 ")] {
            assert_eq!(lenient_integer(&raw), Some(50), "value {raw}");
        }
    }

    #[test]
    fn test_tail_ignores_unparseable_values() {
        for raw in [json!("many"), json!("5.5"), json!(true), json!(null), json!([10])] {
            assert_eq!(lenient_integer(&raw), None, "value {raw}");
        }
    }

    #[test]
    fn test_non_object_arguments_are_empty() {
        assert_eq!(ToolArguments::new(json!(null)), ToolArguments::default());
        assert_eq!(ToolArguments::new(json!("pod")), ToolArguments::default());
    }

    #[test]
    fn test_string_arguments() {
        let args = ToolArguments::from(json!({"name": "web-0", "namespace": "", "tail": 5}));
        assert_eq!(args.string("name").as_deref(), Some("web-0"));
        assert_eq!(args.string("namespace").as_deref(), Some(""));
        assert_eq!(args.non_empty_string("namespace"), None);
        assert_eq!(args.string("tail"), None);
        assert_eq!(args.lenient_integer("tail"), Some(5));
        assert_eq!(args.lenient_integer("missing"), None);
    }
}
