mod app;
mod config;
mod logging;
mod signals;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, CliOverrides};

/// VoxBox Server - multi-tenant voting backend
#[derive(Parser)]
#[command(name = "voxbox-server")]
#[command(about = "VoxBox Server - multi-tenant voting backend")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP listener
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
    });

    if cli.print_config {
        println!("{}", config.to_redacted_json()?);
        return Ok(());
    }

    let _log_guard = logging::init(&config.logging)?;
    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "voxbox server starting");
            app::serve(config).await
        }
        Commands::Check => {
            println!("Configuration is valid");
            Ok(())
        }
    }
}
