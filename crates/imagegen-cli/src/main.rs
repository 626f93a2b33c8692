//! imagegen-mcp CLI main entry point

use clap::Parser;
use imagegen_cli::{
    cli::{Cli, Commands},
    commands::{CallCommand, DoctorCommand, ToolsCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::info;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("imagegen-mcp v{} (profile: {})", env!("CARGO_PKG_VERSION"), cli.profile);
    let config = cli.server_config();

    match cli.command {
        Commands::Serve { args } => imagegen_cli::commands::serve::execute(args, config)
            .await
            .map_err(|e| e.into()),
        Commands::Tools { pretty } => ToolsCommand::run(config, pretty),
        Commands::Call { tool, args } => CallCommand::run(config, &tool, args.as_deref()).await,
        Commands::Doctor { output_dir } => DoctorCommand::run(config, output_dir).await,
    }
}
