//! # Seek CLI
//!
//! Command-line front end for the Seek quick launcher.
//!
//! ## Commands
//!
//! - `seek query <text>` - Show merged results from every provider
//! - `seek run <text>` - Search, then activate one of the results
//! - `seek index` - Crawl the filesystem cache and report its size
//! - `seek config` - Show the effective configuration, or write it with `--init`
//!
//! ## Example Usage
//!
//! ```bash
//! # Calculator
//! seek query "=2**10"
//!
//! # Files, after the crawl has finished
//! seek query report --wait
//!
//! # Open a terminal running a command
//! seek run '$htop'
//! ```

mod app;
mod commands;

use clap::{Parser, Subcommand};
use seek_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Seek - type something, launch something
#[derive(Parser)]
#[command(name = "seek")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(short, long, global = true, env = "SEEK_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show merged results for a query
    Query {
        /// Query text (`=` for the calculator, `$` for a terminal command)
        text: String,

        /// Maximum number of results to show (defaults to general.max_results)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,

        /// Wait for the filesystem crawl before matching files
        #[arg(short, long)]
        wait: bool,
    },

    /// Search, then activate one result
    Run {
        /// Query text
        text: String,

        /// Position of the result to activate in the merged list
        #[arg(short, long, default_value = "0")]
        pick: usize,

        /// Wait for the filesystem crawl before matching files
        #[arg(short, long)]
        wait: bool,
    },

    /// Crawl the filesystem cache and report its size
    Index,

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,

        /// With --init, overwrite an existing file
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("text") {
            Ok(OutputFormat::Text)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(OutputFormat::Json)
        } else {
            Err(format!("Unknown output format: {} (expected text or json)", s))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Setup logging: RUST_LOG, then flags, then the config file
    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.general.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Query {
            text,
            limit,
            output,
            wait,
        } => commands::query::run(config, &text, limit, output, wait),
        Commands::Run { text, pick, wait } => commands::run::run(config, &text, pick, wait),
        Commands::Index => commands::index::run(config),
        Commands::Config { init, force } => {
            commands::config::run(config, cli.config, init, force)
        }
    }
}
