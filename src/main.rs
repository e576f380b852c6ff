// QuickSight Backup - Dependency-aware QuickSight asset backup
// Copyright (c) 2025 QuickSight Backup Contributors
// Licensed under the MIT License

use clap::Parser;
use quicksight_backup::cli::{Cli, Commands};
use quicksight_backup::config::{load_config, LoggingConfig};
use quicksight_backup::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the configuration when it loads; commands
    // report configuration errors themselves
    let (logging_config, config_level) = match load_config(&cli.config) {
        Ok(config) => (config.logging, config.application.log_level),
        Err(_) => (LoggingConfig::console_only(), "info".to_string()),
    };
    let log_level = cli.log_level.clone().unwrap_or(config_level);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "QuickSight Backup - asset bundle backup tool"
    );

    let exit_code = tokio::select! {
        result = execute_command(&cli) => match result {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "Command execution failed");
                eprintln!("Error: {e}");
                5 // Fatal error exit code
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Received SIGINT (Ctrl+C), stopping");
            println!("\n⚠️  Interrupted, in-flight export jobs are left to finish server-side");
            130
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Backup(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Check(args) => args.execute(&cli.config).await,
    }
}
