//! Logging and observability
//!
//! Structured logging with:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use quicksight_backup::logging::init_logging;
//! use quicksight_backup::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use quicksight_backup::log_retry_attempt;
///
/// log_retry_attempt!("start_export_job", 2, 6, 1500u64, "ThrottlingException");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($operation:expr, $attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            operation = $operation,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

/// Log a skip decision
///
/// # Example
///
/// ```no_run
/// use quicksight_backup::log_skip;
/// use quicksight_backup::domain::{AssetKind, AssetRecord, SkipRecord};
///
/// let asset = AssetRecord::new(AssetKind::Dataset, "ds-1", "arn:ds-1", "Sales");
/// let skip = SkipRecord::for_asset(&asset, "FILE dataset type not supported by AssetBundle API");
/// log_skip!(&skip);
/// ```
#[macro_export]
macro_rules! log_skip {
    ($record:expr) => {
        tracing::warn!(
            kind = %$record.resource_kind,
            resource_id = %$record.resource_id,
            resource_name = %$record.resource_name,
            reason = %$record.reason,
            "Skipping asset"
        );
    };
}

/// Log the outcome of one exported chunk
///
/// # Example
///
/// ```no_run
/// use quicksight_backup::log_chunk_outcome;
/// use quicksight_backup::domain::AssetKind;
///
/// log_chunk_outcome!(AssetKind::Dataset, 2, 50usize, true);
/// ```
#[macro_export]
macro_rules! log_chunk_outcome {
    ($kind:expr, $chunk:expr, $assets:expr, $success:expr) => {
        if $success {
            tracing::info!(
                kind = %$kind,
                chunk = $chunk,
                assets = $assets,
                "Bundle exported and stored"
            );
        } else {
            tracing::error!(
                kind = %$kind,
                chunk = $chunk,
                assets = $assets,
                "Bundle failed"
            );
        }
    };
}
