use std::sync::Arc;

use crate::ToolDispatcher;
use imagegen_protocol_adapter::dto::{InvokeRequest, InvokeResult, ProtocolError, ToolSpec};
use imagegen_protocol_adapter::traits::{ToolCatalog, ToolInvoker};

/// Protocol adapter that bridges rmcp <-> the tool dispatcher.
#[derive(Debug, Clone)]
pub struct McpAdapter {
    dispatcher: Arc<ToolDispatcher>,
}

impl McpAdapter {
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl ToolCatalog for McpAdapter {
    fn list_tools<'a>(
        &'a self,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<ToolSpec>, ProtocolError>> + Send + 'a>,
    > {
        Box::pin(async move { Ok(self.dispatcher.list_tools().to_vec()) })
    }
}

impl ToolInvoker for McpAdapter {
    fn invoke<'a>(
        &'a self,
        req: InvokeRequest,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<InvokeResult, ProtocolError>> + Send + 'a>,
    > {
        Box::pin(async move {
            self.dispatcher.call(&req.tool, &req.args).await.map_err(ProtocolError::from)
        })
    }
}
