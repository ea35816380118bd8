use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "ilf")]
#[command(about = "ilf - upload local images in markdown notes to an image host")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/imglift/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload all local images referenced in the given notes and rewrite
    /// their links to the returned public URLs
    Upload {
        /// Markdown note files to process
        #[arg(required = true)]
        notes: Vec<PathBuf>,

        /// Vault root to resolve image paths against (overrides config file)
        #[arg(long)]
        vault: Option<PathBuf>,

        /// List what would be uploaded without making any network calls
        #[arg(long)]
        dry_run: bool,

        /// Maximum simultaneous uploads (overrides config file)
        #[arg(long)]
        max_concurrent: Option<usize>,
    },

    /// Manage imglift configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create a config file with default values
    Init {
        /// Where to write the config file (defaults to the standard location)
        path: Option<PathBuf>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the current effective configuration
    Show,

    /// Store the image host API key in the config file
    SetKey {
        /// API key for the image host
        key: String,
    },
}
