use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::ConfigCommands;
use crate::config::CliConfig;

/// Execute config subcommand
pub async fn execute(cmd: ConfigCommands, config_file: Option<PathBuf>) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => init(path.or(config_file), force),
        ConfigCommands::Show => show(config_file),
        ConfigCommands::SetKey { key } => set_key(config_file, key),
    }
}

/// Initialize a new config file with defaults
fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(path) => path,
        None => CliConfig::default_config_path()?,
    };

    if config_path.exists() && !force {
        println!(
            "{} Config file already exists at: {}",
            "Error:".red().bold(),
            config_path.display()
        );
        println!("Use {} to overwrite", "--force".yellow());
        return Ok(());
    }

    CliConfig::default().save(&config_path)?;

    println!(
        "{} Created config file at: {}",
        "Success:".green().bold(),
        config_path.display()
    );
    println!(
        "{}",
        "Replace the placeholder api_key before uploading.".dimmed()
    );

    Ok(())
}

/// Show the current effective configuration
fn show(config_file: Option<PathBuf>) -> Result<()> {
    let config = CliConfig::load(config_file, None)?;
    println!("{}", config.display_as_toml()?);
    Ok(())
}

/// Store the API key in the config file
fn set_key(config_file: Option<PathBuf>, key: String) -> Result<()> {
    let config_path = match config_file {
        Some(path) => path,
        None => CliConfig::default_config_path()?,
    };

    let mut config = CliConfig::load(Some(config_path.clone()), None)
        .context("Failed to load existing configuration")?;
    config.uploader.api_key = key;
    config.save(&config_path)?;

    println!(
        "{} API key saved to: {}",
        "Success:".green().bold(),
        config_path.display()
    );

    Ok(())
}
