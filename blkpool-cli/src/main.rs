mod commands;
mod output;
mod utils;
mod workspace;

use blkpool_core::{Config, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blkpool")]
#[command(about = "blkpool - file-backed block volumes for virtual machines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    #[arg(short, long, global = true, help = "Verbose output")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Quiet output")]
    quiet: bool,

    #[arg(
        long,
        global = true,
        help = "Output format",
        value_enum,
        default_value = "table"
    )]
    format: output::OutputFormat,

    #[arg(
        long,
        global = true,
        env = "BLKPOOL_CONFIG",
        help = "Path to the configuration file (default: ~/.blkpool/config.yaml)"
    )]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;
    commands::execute(cli.command, config, config_path, cli.format).await
}
