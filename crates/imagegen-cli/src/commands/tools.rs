use crate::error::CliResult;
use imagegen_mcp::{ServerConfig, ToolDispatcher};

pub struct ToolsCommand;

impl ToolsCommand {
    pub fn render(config: ServerConfig, pretty: bool) -> CliResult<String> {
        let dispatcher = ToolDispatcher::new(config);
        let tools = dispatcher.list_tools();
        let json = if pretty {
            serde_json::to_string_pretty(tools)?
        } else {
            serde_json::to_string(tools)?
        };
        Ok(json)
    }

    pub fn run(config: ServerConfig, pretty: bool) -> CliResult<()> {
        println!("{}", Self::render(config, pretty)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_catalog_json() {
        let json = ToolsCommand::render(ServerConfig::default(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[1]["name"], "square_image");
    }
}
