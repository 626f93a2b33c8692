//! Routes tool calls by name to their handlers

use crate::catalog::{self, ToolKind};
use crate::config::ServerConfig;
use crate::handler::{self, generate_image};
use crate::runner::{ProcessRunner, ProgressSender};
use crate::{McpError, McpResult};
use imagegen_protocol_adapter::{InvokeResult, ToolSpec};
use serde_json::Value;
use tracing::debug;

/// Owns the static catalog and the process runner shared by every call.
/// Calls share no mutable state, so one dispatcher serves concurrent calls.
#[derive(Debug)]
pub struct ToolDispatcher {
    require_output_dir: bool,
    runner: ProcessRunner,
    tools: Vec<ToolSpec>,
}

impl ToolDispatcher {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            require_output_dir: config.require_output_dir,
            tools: catalog::tool_catalog(config.require_output_dir),
            runner: ProcessRunner::new(config.runner),
        }
    }

    /// Forward runner progress events to `sender`
    pub fn with_progress(mut self, sender: ProgressSender) -> Self {
        self.runner = self.runner.with_progress(sender);
        self
    }

    pub fn list_tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub async fn call(&self, name: &str, arguments: &Value) -> McpResult<InvokeResult> {
        let kind = catalog::resolve(name).ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;
        debug!("Dispatching tool '{}' as {:?}", name, kind);

        match kind {
            ToolKind::Generate => generate_image(arguments, self.require_output_dir, &self.runner).await,
            ToolKind::Preset(preset) => {
                let merged = handler::with_fixed_size(arguments, preset.size())?;
                generate_image(&merged, self.require_output_dir, &self.runner).await
            }
        }
    }
}
