//! imagegen MCP (Model Context Protocol) Server
//!
//! Exposes a fixed set of image generation tools over MCP and fulfils each
//! call by running an external generator CLI as a subprocess.

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod jsonrpc;
pub mod mcp;
pub mod output_dir;
pub mod runner;
pub mod server;
pub mod server_rmcp;

// Re-export key types
pub use adapter::McpAdapter;
pub use config::{Profile, RunnerConfig, ServerConfig};
pub use dispatcher::ToolDispatcher;
pub use error::{McpError, McpResult};
pub use runner::{ProcessOutput, ProcessRunner, ProgressEvent};
pub use server::McpServer;

pub use server::{serve_http, serve_stdio};
pub use server_rmcp::serve_stdio_rmcp;
