//! Hand-rolled MCP server: line-delimited JSON-RPC over stdio and HTTP

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::{
    jsonrpc::{
        JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
        JSONRPC_VERSION, METHOD_NOT_FOUND,
    },
    mcp::{
        Implementation, InitializeRequest, InitializeResponse, ServerCapabilities, Tool,
        ToolsCallRequest, ToolsCallResponse, ToolsCapability,
        ToolsListResponse, LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE, METHOD_PING,
        METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, SUPPORTED_PROTOCOL_VERSIONS,
    },
    McpError, McpResult, ToolDispatcher,
};

pub const SERVER_NAME: &str = "imagegen-mcp";
pub const SERVER_INSTRUCTIONS: &str =
    "Generate images from text prompts. Use square_image, landscape_image or portrait_image for fixed sizes.";

/// MCP Server
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl McpServer {
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Process a single MCP message. Returns `None` for notifications.
    pub async fn process_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error(e.to_string())));
            }
        };

        debug!("Processing method: {}", request.method);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                request.id,
                JsonRpcError::invalid_request("Invalid JSON-RPC version"),
            ));
        }

        // Notifications get no response
        if request.is_notification() {
            debug!("Received notification '{}', ignoring", request.method);
            return None;
        }

        let result = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(&request),
            METHOD_PING => Ok(serde_json::json!({})),
            METHOD_TOOLS_LIST => self.handle_tools_list(),
            METHOD_TOOLS_CALL => self.handle_tools_call(&request).await,
            other => {
                return Some(JsonRpcResponse::failure(
                    request.id.clone(),
                    JsonRpcError::unknown_method(other),
                ))
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::failure(request.id, e.to_jsonrpc_error()),
        })
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let params = request.params.as_ref().ok_or_else(|| {
            McpError::InvalidArguments("Missing params for initialize".to_string())
        })?;
        let init_request: InitializeRequest = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidArguments(format!("Invalid initialize params: {}", e)))?;

        if let Some(client) = &init_request.client_info {
            info!("Client connected: {} {}", client.name, client.version);
        }

        let protocol_version =
            if SUPPORTED_PROTOCOL_VERSIONS.contains(&init_request.protocol_version.as_str()) {
                init_request.protocol_version
            } else {
                LATEST_PROTOCOL_VERSION.to_string()
            };

        let response = InitializeResponse {
            protocol_version,
            capabilities: ServerCapabilities { tools: Some(ToolsCapability { list_changed: None }) },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Image generation MCP".to_string()),
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        };
        Ok(serde_json::to_value(response)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let tools: Vec<Tool> = self.dispatcher.list_tools().iter().map(Tool::from).collect();
        Ok(serde_json::to_value(ToolsListResponse { tools, next_cursor: None })?)
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let params = request.params.as_ref().ok_or_else(|| {
            McpError::InvalidArguments("Missing params for tools/call".to_string())
        })?;
        let call_request: ToolsCallRequest = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidArguments(format!("Invalid tools/call params: {}", e)))?;

        debug!("Calling tool: {}", call_request.name);
        let args = call_request.arguments.unwrap_or(Value::Null);
        let result = self.dispatcher.call(&call_request.name, &args).await.map_err(|e| {
            warn!("Tool '{}' failed: {}", call_request.name, e);
            e
        })?;
        Ok(serde_json::to_value(ToolsCallResponse::from(result))?)
    }
}

/// Serve MCP over stdio, one JSON-RPC message per line
pub async fn serve_stdio(dispatcher: Arc<ToolDispatcher>) -> McpResult<()> {
    info!("Starting imagegen MCP server (line-delimited stdio mode)");

    let server = McpServer::new(dispatcher);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Processing line: {}", trimmed);

        // MCP doesn't support batch requests
        let response = if trimmed.starts_with('[') {
            error!("Batch requests are not supported");
            Some(JsonRpcResponse::failure(
                None,
                JsonRpcError::invalid_request("Batch requests are not supported"),
            ))
        } else {
            server.process_message(trimmed.as_bytes()).await
        };

        if let Some(response) = response {
            let mut response_json = serde_json::to_string(&response)?;
            response_json.push('\n');
            stdout.write_all(response_json.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    info!("MCP server stopped");
    Ok(())
}

/// HTTP status for a JSON-RPC response
pub fn http_status_for(response: &JsonRpcResponse) -> axum::http::StatusCode {
    use axum::http::StatusCode;

    let Some(error) = &response.error else {
        return StatusCode::OK;
    };
    let reason = error.data.as_ref().and_then(|d| d.get("reason")).and_then(|r| r.as_str());
    match (error.code, reason) {
        (INVALID_PARAMS, _) => StatusCode::BAD_REQUEST,
        (METHOD_NOT_FOUND, _) => StatusCode::NOT_FOUND,
        (INTERNAL_ERROR, Some("timeout")) => StatusCode::GATEWAY_TIMEOUT,
        (INTERNAL_ERROR, _) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Router serving JSON-RPC over HTTP POST `/mcp`
pub fn http_router(dispatcher: Arc<ToolDispatcher>) -> axum::Router {
    use axum::{
        extract::State,
        http::{HeaderMap, HeaderValue, StatusCode},
        response::Json,
        routing::post,
    };
    use uuid::Uuid;

    async fn handle_mcp_request(
        State(server): State<Arc<McpServer>>,
        headers: HeaderMap,
        body: axum::body::Bytes,
    ) -> (StatusCode, HeaderMap, Json<Value>) {
        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            "mcp-protocol-version",
            HeaderValue::from_static(LATEST_PROTOCOL_VERSION),
        );
        if let Ok(session) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            response_headers.insert("mcp-session-id", session);
        }

        if let Some(protocol_version) = headers.get("mcp-protocol-version") {
            let version_str = protocol_version.to_str().unwrap_or("");
            if !SUPPORTED_PROTOCOL_VERSIONS.contains(&version_str) {
                warn!("Unsupported MCP protocol version: {}", version_str);
                return (
                    StatusCode::BAD_REQUEST,
                    response_headers,
                    Json(serde_json::json!({
                        "error": "Unsupported MCP protocol version",
                        "supported_versions": SUPPORTED_PROTOCOL_VERSIONS
                    })),
                );
            }
        }

        match server.process_message(&body[..]).await {
            Some(response) => {
                let status = http_status_for(&response);
                let json = serde_json::to_value(&response).unwrap_or_else(|e| {
                    serde_json::json!({"jsonrpc": JSONRPC_VERSION, "error": {"code": INTERNAL_ERROR, "message": e.to_string()}})
                });
                (status, response_headers, Json(json))
            }
            // Notification - no response body
            None => (StatusCode::ACCEPTED, response_headers, Json(serde_json::json!({}))),
        }
    }

    let server = Arc::new(McpServer::new(dispatcher));
    axum::Router::new().route("/mcp", post(handle_mcp_request)).with_state(server)
}

/// Serve MCP over HTTP
pub async fn serve_http(dispatcher: Arc<ToolDispatcher>, addr: &str) -> McpResult<()> {
    info!("Starting imagegen MCP server (HTTP mode) on {}", addr);

    let app = http_router(dispatcher);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| McpError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("HTTP MCP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| McpError::Internal(format!("HTTP server error: {}", e)))?;

    Ok(())
}
