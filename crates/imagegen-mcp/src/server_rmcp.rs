use std::sync::Arc;

use crate::server::{SERVER_INSTRUCTIONS, SERVER_NAME};
use crate::{McpAdapter, McpResult, ToolDispatcher};
use imagegen_protocol_adapter::{dto::InvokeRequest, mcp as adapter_mcp};
use imagegen_protocol_adapter::traits::{ToolCatalog, ToolInvoker};
use rmcp::{
    handler::server::ServerHandler,
    model as m,
    service::RequestContext,
    service::{serve_server, RoleServer},
};
use tracing::{debug, info};

pub struct RmcpImageServer {
    adapter: McpAdapter,
}

impl RmcpImageServer {
    pub fn new(adapter: McpAdapter) -> Self {
        Self { adapter }
    }

    async fn tools(&self) -> Result<Vec<m::Tool>, rmcp::ErrorData> {
        let specs = self.adapter.list_tools().await.map_err(adapter_mcp::to_mcp_error)?;
        Ok(specs.iter().map(adapter_mcp::to_mcp_tool).collect())
    }

    async fn call(&self, request: m::CallToolRequestParam) -> Result<m::CallToolResult, rmcp::ErrorData> {
        debug!("Calling tool: {}", request.name);
        let args = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or_else(|| serde_json::json!({}));
        let req = InvokeRequest::new(request.name.to_string(), args);
        let res = self.adapter.invoke(req).await.map_err(adapter_mcp::to_mcp_error)?;
        Ok(adapter_mcp::to_mcp_call_result(&res))
    }
}

impl ServerHandler for RmcpImageServer {
    fn get_info(&self) -> m::ServerInfo {
        m::ServerInfo {
            capabilities: m::ServerCapabilities::builder().enable_tools().build(),
            server_info: m::Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Image generation MCP".to_string()),
                ..m::Implementation::from_build_env()
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<m::PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        async move {
            let tools = self.tools().await?;
            Ok(m::ListToolsResult { tools, next_cursor: None })
        }
    }

    fn call_tool(
        &self,
        request: m::CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CallToolResult, rmcp::ErrorData>> + Send + '_ {
        self.call(request)
    }
}

/// Serve MCP using official rmcp stdio transport
pub async fn serve_stdio_rmcp(dispatcher: Arc<ToolDispatcher>) -> McpResult<()> {
    info!("Starting imagegen MCP server (rmcp stdio mode)");
    let server = RmcpImageServer::new(McpAdapter::new(dispatcher));
    let running = serve_server(server, (tokio::io::stdin(), tokio::io::stdout()))
        .await
        .map_err(|e| crate::error::McpError::Internal(format!("rmcp init error: {}", e)))?;
    // block until the client disconnects
    let _ = running.waiting().await;
    info!("MCP server stopped");
    Ok(())
}
