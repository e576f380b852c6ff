//! Configuration management.
//!
//! # Overview
//!
//! The backup tool uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `QSBACKUP_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quicksight_backup::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("quicksight-backup.toml")?;
//!
//! println!("Account: {}", config.aws.account_id);
//! println!("Bucket: {}", config.s3.bucket_name);
//! println!("Max per bundle: {}", config.backup.max_assets_per_bundle);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [aws]
//! region = "us-east-1"
//! account_id = "123456789012"
//! secret_access_key = "${QS_SECRET_ACCESS_KEY}"
//! access_key_id = "AKIA..."
//!
//! [s3]
//! bucket_name = "my-quicksight-backups"
//! prefix = "quicksight-backups"
//! prefix_format = "YYYY/MM/DD"
//!
//! [backup]
//! export_format = "QUICKSIGHT_JSON"
//! max_assets_per_bundle = 50
//!
//! [export.retry]
//! max_attempts = 6
//!
//! [export.poll]
//! max_wait_secs = 1200
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, AwsConfig, BackupConfig, BackupSettings, ExportConfig, LoggingConfig,
    PollConfig, RetryConfig, S3Config, TransferSettings,
};
pub use secret::{secret_string, SecretString, SecretValue};
