//! MCP server command

use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tracing::info;

use imagegen_mcp::{serve_http, serve_stdio, serve_stdio_rmcp, ServerConfig, ToolDispatcher};

#[derive(Args)]
pub struct ServeArgs {
    /// Serve JSON-RPC over HTTP on this address instead of stdio
    #[arg(long, conflicts_with = "line_stdio")]
    pub http: Option<String>,

    /// Use the built-in line-delimited stdio transport instead of rmcp
    #[arg(long)]
    pub line_stdio: bool,
}

pub async fn execute(args: ServeArgs, config: ServerConfig) -> Result<()> {
    info!(
        "Generator: {} (timeout {}s, output_dir required: {})",
        config.runner.program,
        config.runner.timeout.as_secs(),
        config.require_output_dir
    );
    if config.runner.api_key.is_some() {
        info!("Provider credential will be forwarded to the generator");
    }

    let dispatcher = Arc::new(ToolDispatcher::new(config));

    if let Some(addr) = args.http {
        serve_http(dispatcher, &addr).await?;
    } else if args.line_stdio {
        serve_stdio(dispatcher).await?;
    } else {
        serve_stdio_rmcp(dispatcher).await?;
    }

    Ok(())
}
