//! Check command implementation
//!
//! This module implements the `check` command, which verifies that the
//! catalog service and the destination bucket are reachable with the
//! configured credentials.

use crate::config::load_config;
use crate::core::export::{BackupCoordinator, PrerequisiteReport};
use clap::Args;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking service connectivity");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let account_id = config.aws.account_id.clone();
        let bucket = config.s3.bucket_name.clone();

        let coordinator = match BackupCoordinator::from_config(config).await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to create service clients");
                println!("   Error: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let report = coordinator.check_prerequisites().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report, &account_id, &bucket);
        }

        Ok(if report.is_ready() { 0 } else { 4 })
    }
}

fn print_report(report: &PrerequisiteReport, account_id: &str, bucket: &str) {
    println!("🔌 Connectivity Check");
    println!();

    if report.catalog_reachable {
        println!("✅ QuickSight account {account_id} reachable");
    } else {
        println!("❌ QuickSight account {account_id} unreachable");
        if let Some(e) = &report.catalog_error {
            println!("   Error: {e}");
        }
    }

    if report.bucket_reachable {
        println!("✅ Bucket {bucket} reachable");
    } else {
        println!("❌ Bucket {bucket} unreachable");
        if let Some(e) = &report.bucket_error {
            println!("   Error: {e}");
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_args_defaults() {
        let args = CheckArgs { json: false };
        assert!(!args.json);
    }

    #[tokio::test]
    async fn test_check_missing_config() {
        let code = CheckArgs { json: false }
            .execute("/nonexistent/quicksight-backup.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
