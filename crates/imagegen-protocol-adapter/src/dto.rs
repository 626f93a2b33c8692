use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Protocol-agnostic tool specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub annotations: Option<JsonValue>,
    /// Full JSON Schema object (`type`, `properties`, `required`)
    pub input_schema: JsonValue,
    #[serde(default)]
    pub output_schema: Option<JsonValue>,
}

impl ToolSpec {
    /// Names listed under the schema's `required` array
    pub fn required_fields(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Protocol-agnostic tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub tool: String,
    /// Arbitrary JSON arguments defined by tool schema
    #[serde(default)]
    pub args: JsonValue,
}

impl InvokeRequest {
    pub fn new<T: Into<String>>(tool: T, args: JsonValue) -> Self {
        Self { tool: tool.into(), args }
    }
}

/// Protocol-agnostic invocation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResult {
    /// Human-readable payload returned to the caller
    pub text: String,
    /// Optional machine-readable companion to `text`
    #[serde(default)]
    pub structured: Option<JsonValue>,
}

impl InvokeResult {
    pub fn text<T: Into<String>>(text: T) -> Self {
        Self { text: text.into(), structured: None }
    }

    pub fn with_structured(mut self, structured: JsonValue) -> Self {
        self.structured = Some(structured);
        self
    }
}

/// Machine-readable error classes understood by every transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidParams,
    MethodNotFound,
    InternalError,
}

impl ErrorKind {
    /// JSON-RPC 2.0 error code for this kind
    pub fn jsonrpc_code(self) -> i32 {
        match self {
            ErrorKind::InvalidParams => -32602,
            ErrorKind::MethodNotFound => -32601,
            ErrorKind::InternalError => -32603,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidParams => "INVALID_PARAMS",
            ErrorKind::MethodNotFound => "METHOD_NOT_FOUND",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol-agnostic error model
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ProtocolError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default)]
    pub data: Option<JsonValue>,
}

impl ProtocolError {
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M, data: Option<JsonValue>) -> Self {
        Self { kind, message: message.into(), data }
    }

    pub fn invalid_params<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::InvalidParams, message, None)
    }

    pub fn method_not_found<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::MethodNotFound, message, None)
    }
}
