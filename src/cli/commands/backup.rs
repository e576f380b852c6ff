//! Backup command implementation
//!
//! This module implements the `backup` command, which discovers and
//! validates assets, exports them as bundles and stores the bundles in the
//! destination bucket.

use crate::config::load_config;
use crate::core::export::{BackupCoordinator, BackupStatus, BackupSummary};
use crate::core::manifest::BackupManifest;
use crate::domain::AssetKind;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the backup command
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - discover and validate without starting export jobs
    #[arg(long)]
    pub dry_run: bool,

    /// Override the directory for the run manifest
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the maximum assets per bundle (1-100)
    #[arg(long, value_name = "N")]
    pub max_per_bundle: Option<usize>,

    /// Restrict the run to these kinds (comma-separated)
    #[arg(long, value_name = "KINDS")]
    pub kinds: Option<String>,
}

/// Parse a comma-separated list of asset kinds, in dependency order
pub fn parse_kinds(value: &str) -> Result<Vec<AssetKind>, String> {
    let mut kinds = value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<AssetKind>)
        .collect::<Result<Vec<_>, _>>()?;

    if kinds.is_empty() {
        return Err("At least one asset kind must be given".to_string());
    }

    kinds.sort();
    kinds.dedup();
    Ok(kinds)
}

/// Process exit code for a finished run
pub fn exit_code_for(status: BackupStatus) -> i32 {
    match status {
        BackupStatus::Successful => 0,
        BackupStatus::Partial => 1,
        BackupStatus::Failed => 3,
    }
}

impl BackupArgs {
    /// Execute the backup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting backup command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(kinds) = &self.kinds {
            match parse_kinds(kinds) {
                Ok(kinds) => {
                    tracing::info!(kinds = ?kinds, "Restricting asset kinds from CLI");
                    config.backup.restrict_to(&kinds);
                }
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(2);
                }
            }
        }

        if let Some(max) = self.max_per_bundle {
            tracing::info!(max_per_bundle = max, "Overriding bundle size from CLI");
            config.backup.max_assets_per_bundle = max;
        }

        if let Some(dir) = &self.output_dir {
            config.application.output_dir = dir.display().to_string();
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no export jobs will be started");
            println!("🔍 DRY RUN MODE - No export jobs will be started");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !dry_run {
            println!("Backup Configuration:");
            println!("  Account: {}", config.aws.account_id);
            println!("  Region: {}", config.aws.region);
            println!(
                "  Kinds: {}",
                config
                    .backup
                    .enabled_kinds()
                    .iter()
                    .map(AssetKind::label)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  Bucket: {}", config.s3.bucket_name);
            println!("  Max per bundle: {}", config.backup.max_assets_per_bundle);
            println!();
            print!("Proceed with backup? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Backup cancelled.");
                return Ok(0);
            }
        }

        let output_dir = PathBuf::from(&config.application.output_dir);
        let manifest_config = config.clone();

        // Create backup coordinator
        tracing::info!("Creating backup coordinator");
        let coordinator = match BackupCoordinator::from_config(config).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create backup coordinator");
                eprintln!("❌ Failed to initialize backup: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        // Prerequisite check
        let report = coordinator.check_prerequisites().await;
        if !report.is_ready() {
            eprintln!("❌ Prerequisite check failed");
            if let Some(e) = &report.catalog_error {
                eprintln!("   Catalog service: {e}");
            }
            if let Some(e) = &report.bucket_error {
                eprintln!("   Bucket: {e}");
            }
            return Ok(4);
        }

        println!("🚀 Starting backup...");
        println!();

        let summary = match coordinator.execute_backup().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Backup failed");
                eprintln!("❌ Backup failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        print_summary(&summary);

        let manifest = BackupManifest::new(&manifest_config, &summary);
        match manifest.write_to_dir(&output_dir, &BackupManifest::file_name(&summary)) {
            Ok(path) => println!("📄 Manifest written to {}", path.display()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to write backup manifest");
                println!("⚠️  Failed to write manifest: {e}");
            }
        }

        let status = summary.status();
        match status {
            BackupStatus::Successful if dry_run => println!("✅ Dry run completed"),
            BackupStatus::Successful => println!("✅ Backup completed successfully!"),
            BackupStatus::Partial => println!("⚠️  Backup completed with failures"),
            BackupStatus::Failed => println!("❌ Backup failed"),
        }

        Ok(exit_code_for(status))
    }
}

fn print_summary(summary: &BackupSummary) {
    println!();
    println!("📊 Backup Summary:");
    for (kind, counts) in &summary.kinds {
        println!(
            "  {:<12} validated {:>4}  processed {:>4}  failed {:>4}  skipped {:>4}",
            kind.label(),
            counts.validated,
            counts.processed,
            counts.failed,
            counts.skipped
        );
    }
    println!("  Processed: {}", summary.processed);
    println!("  Failed: {}", summary.failed);
    println!("  Skipped: {}", summary.skipped.len());
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    if !summary.skipped.is_empty() {
        println!("⏭️  Skipped assets:");
        for skip in &summary.skipped {
            println!(
                "  - [{}] {} ({}): {}",
                skip.resource_kind, skip.resource_name, skip.resource_id, skip.reason
            );
        }
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}
