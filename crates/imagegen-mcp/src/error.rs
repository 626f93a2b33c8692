//! Error handling for the image generation MCP server

use crate::jsonrpc::JsonRpcError;
use imagegen_protocol_adapter::{ErrorKind, ProtocolError};
use std::time::Duration;
use thiserror::Error;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur while serving a tool call
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Failed to start image generator '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Image generation failed with exit code {}\nstdout:\n{stdout}\nstderr:\n{stderr}",
        exit_code_label(.exit_code)
    )]
    ProcessFailed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Image generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

impl McpError {
    /// Protocol-level class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            McpError::InvalidArguments(_) => ErrorKind::InvalidParams,
            McpError::ToolNotFound(_) => ErrorKind::MethodNotFound,
            _ => ErrorKind::InternalError,
        }
    }

    /// Short machine-readable reason, finer grained than [`ErrorKind`]
    pub fn reason(&self) -> &'static str {
        match self {
            McpError::InvalidArguments(_) => "invalid_arguments",
            McpError::ToolNotFound(_) => "tool_not_found",
            McpError::Spawn { .. } => "spawn_failed",
            McpError::ProcessFailed { .. } => "process_failed",
            McpError::Timeout(_) => "timeout",
            McpError::Serialization(_) => "serialization",
            McpError::Io(_) => "io",
            McpError::Internal(_) => "internal",
        }
    }

    fn data(&self) -> serde_json::Value {
        let mut data = serde_json::json!({ "reason": self.reason() });
        match self {
            McpError::ProcessFailed { exit_code, stdout, stderr } => {
                data["exitCode"] = serde_json::json!(exit_code);
                data["stdout"] = serde_json::json!(stdout);
                data["stderr"] = serde_json::json!(stderr);
            }
            McpError::Timeout(limit) => {
                data["timeoutSecs"] = serde_json::json!(limit.as_secs());
            }
            McpError::Spawn { program, .. } => {
                data["program"] = serde_json::json!(program);
            }
            _ => {}
        }
        data
    }

    /// Convert to the transport-neutral error model
    pub fn to_protocol_error(&self) -> ProtocolError {
        ProtocolError::new(self.kind(), self.to_string(), Some(self.data()))
    }

    /// Convert to JSON-RPC error
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        JsonRpcError::from_kind(self.kind(), self.to_string()).with_data(self.data())
    }
}

impl From<McpError> for ProtocolError {
    fn from(err: McpError) -> Self {
        err.to_protocol_error()
    }
}
