//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use imagegen_mcp::config::DEFAULT_PROGRAM;
use imagegen_mcp::{Profile, RunnerConfig, ServerConfig};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "imagegen-mcp",
    about = "MCP server exposing image generation tools backed by an external generator CLI",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Behaviour preset: "full" (output_dir required, key forwarded, 5 min
    /// watchdog) or "minimal" (output_dir optional, 60 s watchdog)
    #[arg(long, env = "IMAGEGEN_PROFILE", default_value = "full")]
    pub profile: Profile,

    /// Image generator executable
    #[arg(long = "command", env = "IMAGEGEN_COMMAND", default_value = DEFAULT_PROGRAM)]
    pub generator: String,

    /// Override the profile's watchdog timeout (at least 1 second)
    #[arg(long, env = "IMAGEGEN_TIMEOUT_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Provider credential forwarded to the generator as --api-key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

impl Cli {
    /// Resolve the dispatcher configuration from flags and environment
    pub fn server_config(&self) -> ServerConfig {
        let runner = RunnerConfig::default()
            .with_program(self.generator.clone())
            .with_api_key(self.api_key.clone());
        let config = ServerConfig::for_profile(self.profile, runner);
        match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP server
    Serve {
        #[command(flatten)]
        args: crate::commands::ServeArgs,
    },
    /// Print the tool catalog as JSON
    Tools {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Run a single tool call and print its result
    Call {
        /// Tool name (e.g. square_image)
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },
    /// Check the generator executable and, optionally, an output directory
    Doctor {
        /// Output directory to probe for writability
        #[arg(long)]
        output_dir: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_full_profile() {
        let cli = Cli::try_parse_from(["imagegen-mcp", "tools"]).unwrap();
        assert_eq!(cli.profile, Profile::Full);
        let config = cli.server_config();
        assert!(config.require_output_dir);
        assert_eq!(config.runner.timeout, Duration::from_secs(300));
    }

    #[test]
    fn timeout_override_applies_after_profile() {
        let cli = Cli::try_parse_from([
            "imagegen-mcp",
            "--profile",
            "minimal",
            "--timeout-secs",
            "5",
            "--command",
            "/opt/bin/gen",
            "serve",
        ])
        .unwrap();
        let config = cli.server_config();
        assert!(!config.require_output_dir);
        assert_eq!(config.runner.timeout, Duration::from_secs(5));
        assert_eq!(config.runner.program, "/opt/bin/gen");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["imagegen-mcp", "--timeout-secs", "0", "tools"]).is_err());
    }

    #[test]
    fn call_command_parsing() {
        let cli = Cli::try_parse_from([
            "imagegen-mcp",
            "call",
            "square_image",
            "--args",
            r#"{"prompt": "cat"}"#,
        ])
        .unwrap();
        if let Commands::Call { tool, args } = cli.command {
            assert_eq!(tool, "square_image");
            assert_eq!(args.as_deref(), Some(r#"{"prompt": "cat"}"#));
        } else {
            panic!("Expected Call command");
        }
    }

    #[test]
    fn serve_transport_flags_conflict() {
        assert!(Cli::try_parse_from(["imagegen-mcp", "serve", "--line-stdio", "--http", "127.0.0.1:8080"]).is_err());
    }

    #[test]
    fn unknown_profile_is_rejected() {
        assert!(Cli::try_parse_from(["imagegen-mcp", "--profile", "huge", "tools"]).is_err());
    }
}
