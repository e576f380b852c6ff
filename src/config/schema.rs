//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::config::SecretString;
use crate::domain::AssetKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

const MB: u64 = 1024 * 1024;

/// Main backup configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// AWS account and credentials
    pub aws: AwsConfig,

    /// Destination bucket settings
    pub s3: S3Config,

    /// What to back up and how to bundle it
    #[serde(default)]
    pub backup: BackupSettings,

    /// Export job retry and polling
    #[serde(default)]
    pub export: ExportConfig,

    /// Artifact transfer settings
    #[serde(default)]
    pub transfer: TransferSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BackupConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.aws.validate()?;
        self.s3.validate()?;
        self.backup.validate()?;
        self.export.validate()?;
        self.transfer.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (discover and validate, start no export jobs)
    #[serde(default)]
    pub dry_run: bool,

    /// Directory for run manifests
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
            output_dir: default_output_dir(),
        }
    }
}

/// AWS account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region hosting the QuickSight assets and the bucket
    pub region: String,

    /// 12-digit AWS account id
    pub account_id: String,

    /// QuickSight identity region, if different from `region`
    #[serde(default)]
    pub identity_region: Option<String>,

    /// Static access key id (optional, default provider chain otherwise)
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Static secret access key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,

    /// Session token for temporary credentials
    #[serde(default)]
    pub session_token: Option<SecretString>,
}

impl AwsConfig {
    fn validate(&self) -> Result<(), String> {
        let region_re = Regex::new(r"^[a-z0-9-]+$").map_err(|e| e.to_string())?;

        if self.region.is_empty() {
            return Err("aws.region cannot be empty".to_string());
        }
        if !region_re.is_match(&self.region) {
            return Err(format!("Invalid aws.region format: {}", self.region));
        }

        if let Some(identity_region) = &self.identity_region {
            if !region_re.is_match(identity_region) {
                return Err(format!(
                    "Invalid aws.identity_region format: {identity_region}"
                ));
            }
        }

        let account_re = Regex::new(r"^\d{12}$").map_err(|e| e.to_string())?;
        if !account_re.is_match(&self.account_id) {
            return Err(format!(
                "aws.account_id must be exactly 12 digits, got '{}'",
                self.account_id
            ));
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(
                "aws.access_key_id and aws.secret_access_key must be provided together"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Region used for identity operations
    pub fn effective_identity_region(&self) -> &str {
        self.identity_region.as_deref().unwrap_or(&self.region)
    }
}

/// Destination bucket configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket receiving the bundles
    pub bucket_name: String,

    /// Key prefix for all bundles
    #[serde(default = "default_s3_prefix")]
    pub prefix: String,

    /// Date component format (YYYY/MM/DD, YYYY-MM-DD, YYYYMMDD)
    #[serde(default = "default_prefix_format")]
    pub prefix_format: String,

    /// Server-side encryption algorithm
    #[serde(default = "default_server_side_encryption")]
    pub server_side_encryption: String,
}

impl S3Config {
    fn validate(&self) -> Result<(), String> {
        validate_bucket_name(&self.bucket_name)?;
        validate_prefix(&self.prefix)?;

        let valid_formats = ["YYYY/MM/DD", "YYYY-MM-DD", "YYYYMMDD"];
        if !valid_formats.contains(&self.prefix_format.as_str()) {
            tracing::warn!(
                prefix_format = %self.prefix_format,
                "Unrecognized s3.prefix_format, falling back to YYYY/MM/DD"
            );
        }

        let valid_sse = ["AES256", "aws:kms"];
        if !valid_sse.contains(&self.server_side_encryption.as_str()) {
            return Err(format!(
                "Invalid s3.server_side_encryption '{}'. Must be one of: {}",
                self.server_side_encryption,
                valid_sse.join(", ")
            ));
        }

        Ok(())
    }
}

fn validate_bucket_name(name: &str) -> Result<(), String> {
    if name.len() < 3 || name.len() > 63 {
        return Err(format!(
            "s3.bucket_name must be between 3 and 63 characters, got {}",
            name.len()
        ));
    }

    let bucket_re = Regex::new(r"^[a-z0-9][a-z0-9.-]*[a-z0-9]$").map_err(|e| e.to_string())?;
    if !bucket_re.is_match(name) {
        return Err(format!("Invalid s3.bucket_name format: {name}"));
    }

    if ["..", "--", ".-", "-."].iter().any(|p| name.contains(p)) {
        return Err(format!(
            "s3.bucket_name cannot contain consecutive periods or hyphens: {name}"
        ));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(format!(
            "s3.bucket_name cannot be formatted as an IP address: {name}"
        ));
    }

    Ok(())
}

fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Ok(());
    }

    if prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(format!(
            "s3.prefix cannot start or end with '/': {prefix}"
        ));
    }

    if prefix.contains("//") {
        return Err(format!("s3.prefix cannot contain '//': {prefix}"));
    }

    let prefix_re = Regex::new(r"^[a-zA-Z0-9._/-]+$").map_err(|e| e.to_string())?;
    if !prefix_re.is_match(prefix) {
        return Err(format!("s3.prefix contains invalid characters: {prefix}"));
    }

    Ok(())
}

/// Backup scope and bundling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSettings {
    #[serde(default = "default_true")]
    pub include_datasources: bool,

    #[serde(default = "default_true")]
    pub include_datasets: bool,

    #[serde(default = "default_true")]
    pub include_analyses: bool,

    #[serde(default = "default_true")]
    pub include_dashboards: bool,

    /// Ask the export job to include dependencies of each resource
    #[serde(default = "default_true")]
    pub include_dependencies: bool,

    #[serde(default = "default_true")]
    pub include_permissions: bool,

    #[serde(default = "default_true")]
    pub include_tags: bool,

    /// QUICKSIGHT_JSON or CLOUDFORMATION_JSON
    #[serde(default = "default_export_format")]
    pub export_format: String,

    /// Maximum assets per export bundle (1-100)
    #[serde(default = "default_max_assets_per_bundle")]
    pub max_assets_per_bundle: usize,

    /// Chunks exported concurrently per kind
    #[serde(default = "default_max_concurrent_bundles")]
    pub max_concurrent_bundles: usize,
}

impl BackupSettings {
    fn validate(&self) -> Result<(), String> {
        let valid_formats = ["QUICKSIGHT_JSON", "CLOUDFORMATION_JSON"];
        if !valid_formats.contains(&self.export_format.as_str()) {
            return Err(format!(
                "Invalid backup.export_format '{}'. Must be one of: {}",
                self.export_format,
                valid_formats.join(", ")
            ));
        }

        if self.max_assets_per_bundle < 1 || self.max_assets_per_bundle > 100 {
            return Err(format!(
                "backup.max_assets_per_bundle must be between 1 and 100, got {}",
                self.max_assets_per_bundle
            ));
        }

        if self.max_concurrent_bundles < 1 || self.max_concurrent_bundles > 16 {
            return Err(format!(
                "backup.max_concurrent_bundles must be between 1 and 16, got {}",
                self.max_concurrent_bundles
            ));
        }

        Ok(())
    }

    /// Asset kinds enabled for this run, in dependency order
    pub fn enabled_kinds(&self) -> Vec<AssetKind> {
        AssetKind::ALL
            .into_iter()
            .filter(|kind| self.includes(*kind))
            .collect()
    }

    pub fn includes(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Datasource => self.include_datasources,
            AssetKind::Dataset => self.include_datasets,
            AssetKind::Analysis => self.include_analyses,
            AssetKind::Dashboard => self.include_dashboards,
        }
    }

    /// Restrict the run to the given kinds
    pub fn restrict_to(&mut self, kinds: &[AssetKind]) {
        self.include_datasources = kinds.contains(&AssetKind::Datasource);
        self.include_datasets = kinds.contains(&AssetKind::Dataset);
        self.include_analyses = kinds.contains(&AssetKind::Analysis);
        self.include_dashboards = kinds.contains(&AssetKind::Dashboard);
    }
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            include_datasources: true,
            include_datasets: true,
            include_analyses: true,
            include_dashboards: true,
            include_dependencies: true,
            include_permissions: true,
            include_tags: true,
            export_format: default_export_format(),
            max_assets_per_bundle: default_max_assets_per_bundle(),
            max_concurrent_bundles: default_max_concurrent_bundles(),
        }
    }
}

/// Export job settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub poll: PollConfig,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        self.retry.validate()?;
        self.poll.validate()
    }
}

/// Retry configuration for export job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts < 1 || self.max_attempts > 20 {
            return Err(format!(
                "export.retry.max_attempts must be between 1 and 20, got {}",
                self.max_attempts
            ));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(format!(
                "export.retry.max_delay_ms ({}) must be >= base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            ));
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Export job polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_initial_interval_secs")]
    pub initial_interval_secs: u64,

    /// Interval growth after each non-terminal observation
    #[serde(default = "default_poll_multiplier")]
    pub backoff_multiplier: f64,

    /// Overall polling timeout
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl PollConfig {
    fn validate(&self) -> Result<(), String> {
        if self.initial_interval_secs == 0 {
            return Err("export.poll.initial_interval_secs must be > 0".to_string());
        }

        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "export.poll.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.max_wait_secs < self.initial_interval_secs {
            return Err(format!(
                "export.poll.max_wait_secs ({}) must be >= initial_interval_secs ({})",
                self.max_wait_secs, self.initial_interval_secs
            ));
        }

        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval_secs: default_initial_interval_secs(),
            backoff_multiplier: default_poll_multiplier(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

/// Artifact transfer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Artifacts at or above this size use multipart upload
    #[serde(default = "default_multipart_threshold_mb")]
    pub multipart_threshold_mb: u64,

    /// Multipart part size
    #[serde(default = "default_part_size_mb")]
    pub part_size_mb: u64,

    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Read size when streaming the artifact
    #[serde(default = "default_download_chunk_bytes")]
    pub download_chunk_bytes: usize,

    /// Directory for transient spool files (OS temp dir if unset)
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,
}

impl TransferSettings {
    fn validate(&self) -> Result<(), String> {
        if self.multipart_threshold_mb == 0 {
            return Err("transfer.multipart_threshold_mb must be > 0".to_string());
        }

        if self.part_size_mb < 5 || self.part_size_mb > 5120 {
            return Err(format!(
                "transfer.part_size_mb must be between 5 and 5120, got {}",
                self.part_size_mb
            ));
        }

        if self.download_timeout_secs == 0 {
            return Err("transfer.download_timeout_secs must be > 0".to_string());
        }

        if self.download_chunk_bytes == 0 {
            return Err("transfer.download_chunk_bytes must be > 0".to_string());
        }

        Ok(())
    }

    pub fn multipart_threshold_bytes(&self) -> u64 {
        self.multipart_threshold_mb * MB
    }

    pub fn part_size_bytes(&self) -> u64 {
        self.part_size_mb * MB
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            multipart_threshold_mb: default_multipart_threshold_mb(),
            part_size_mb: default_part_size_mb(),
            download_timeout_secs: default_download_timeout_secs(),
            download_chunk_bytes: default_download_chunk_bytes(),
            spool_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }

    /// Console-only logging
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> String {
    "./backup-reports".to_string()
}

fn default_true() -> bool {
    true
}

fn default_s3_prefix() -> String {
    "quicksight-backups".to_string()
}

fn default_prefix_format() -> String {
    "YYYY/MM/DD".to_string()
}

fn default_server_side_encryption() -> String {
    "AES256".to_string()
}

fn default_export_format() -> String {
    "QUICKSIGHT_JSON".to_string()
}

fn default_max_assets_per_bundle() -> usize {
    50
}

fn default_max_concurrent_bundles() -> usize {
    1
}

fn default_max_attempts() -> u32 {
    6
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_initial_interval_secs() -> u64 {
    30
}

fn default_poll_multiplier() -> f64 {
    1.2
}

fn default_max_wait_secs() -> u64 {
    1200
}

fn default_multipart_threshold_mb() -> u64 {
    100
}

fn default_part_size_mb() -> u64 {
    100
}

fn default_download_timeout_secs() -> u64 {
    300
}

fn default_download_chunk_bytes() -> usize {
    8192
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
