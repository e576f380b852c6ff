//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Load configuration (validation runs as part of loading)
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let kinds: Vec<&str> = config
            .backup
            .enabled_kinds()
            .iter()
            .map(|k| k.label())
            .collect();

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  AWS Account: {}", config.aws.account_id);
        println!("  AWS Region: {}", config.aws.region);
        println!(
            "  Credentials: {}",
            if config.aws.access_key_id.is_some() {
                "static (from configuration)"
            } else {
                "default provider chain"
            }
        );
        println!("  Bucket: {}", config.s3.bucket_name);
        println!("  Prefix: {}", config.s3.prefix);
        println!("  Prefix Format: {}", config.s3.prefix_format);
        println!("  Kinds: {}", kinds.join(", "));
        println!("  Export Format: {}", config.backup.export_format);
        println!("  Max Per Bundle: {}", config.backup.max_assets_per_bundle);
        println!(
            "  Concurrent Bundles: {}",
            config.backup.max_concurrent_bundles
        );
        println!("  Retry Attempts: {}", config.export.retry.max_attempts);
        println!("  Poll Timeout: {}s", config.export.poll.max_wait_secs);
        println!(
            "  Multipart Threshold: {} MB",
            config.transfer.multipart_threshold_mb
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/quicksight-backup.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[aws]
region = "us-east-1"
account_id = "123456789012"

[s3]
bucket_name = "qs-backups"

[logging]
local_enabled = false
"#
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
