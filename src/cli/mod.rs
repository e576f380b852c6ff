//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// QuickSight Backup - BI asset bundle backup tool
#[derive(Parser, Debug)]
#[command(name = "quicksight-backup")]
#[command(version, about, long_about = None)]
#[command(author = "QuickSight Backup Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "quicksight-backup.toml",
        env = "QSBACKUP_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "QSBACKUP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export asset bundles and store them in the destination bucket
    Backup(commands::backup::BackupArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Check connectivity to the catalog service and the bucket
    Check(commands::check::CheckArgs),
}
