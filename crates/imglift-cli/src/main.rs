use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use imglift_cli::{
    cli::{Cli, Commands, LogLevel},
    commands, config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level: LevelFilter = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        cli.log_level.unwrap_or(LogLevel::Off).into()
    };
    let env_filter = format!("imglift_cli={level},imglift_core={level}");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .init();

    match cli.command {
        Commands::Upload {
            notes,
            vault,
            dry_run,
            max_concurrent,
        } => {
            let config = config::CliConfig::load(cli.config, vault)?;
            commands::upload::execute(config, notes, dry_run, max_concurrent).await?;
        }

        Commands::Config(cmd) => commands::config::execute(cmd, cli.config).await?,
    }

    Ok(())
}
