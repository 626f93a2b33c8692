use crate::error::CliResult;
use crate::utils::{format_duration, parse_arguments, ColoredOutput};
use imagegen_mcp::{ServerConfig, ToolDispatcher};
use std::time::Instant;

pub struct CallCommand;

impl CallCommand {
    pub async fn run(config: ServerConfig, tool: &str, args: Option<&str>) -> CliResult<()> {
        let arguments = parse_arguments(args)?;
        let dispatcher = ToolDispatcher::new(config);

        let started = Instant::now();
        let result = dispatcher.call(tool, &arguments).await?;

        println!("{}", result.text);
        eprintln!(
            "{} {}",
            ColoredOutput::success("Done"),
            ColoredOutput::dim(&format!("in {}", format_duration(started.elapsed())))
        );
        Ok(())
    }
}
