//! Domain error types
//!
//! This module defines the error hierarchy for the backup tool.
//! Errors are domain-specific and don't expose AWS SDK or HTTP client types.

use thiserror::Error;

/// Main backup error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Catalog service (QuickSight) errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Object storage (S3) errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Artifact download / spooling errors
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Export job reached a failed state or could not be started
    #[error("Export error: {0}")]
    Export(String),

    /// Export job did not reach a terminal state in time
    #[error("Export job {job_id} timed out after {elapsed_secs} seconds")]
    JobTimeout { job_id: String, elapsed_secs: u64 },

    /// Export job vanished or was never created
    #[error("Export job {0} not found")]
    JobNotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl BackupError {
    /// Whether a retry envelope should re-run the failed operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackupError::Catalog(e) if e.is_retryable())
    }
}

/// Catalog service errors
///
/// Service failures are classified by error code so that the validation
/// and export policies can tell explicit signals (not found, invalid
/// parameter) from ambiguous ones (access denied, unknown codes).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The described resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The caller lacks permission for the operation
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The service rejected a request parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Rate limit exceeded
    #[error("Throttled: {0}")]
    Throttling(String),

    /// Transient service-side failure
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other service error
    #[error("{code}: {message}")]
    Other { code: String, message: String },
}

const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "SlowDown",
];

const UNAVAILABLE_CODES: &[&str] = &[
    "ServiceUnavailable",
    "ServiceUnavailableException",
    "InternalFailure",
    "InternalServerError",
    "InternalServerException",
    "InternalFailureException",
    "ServiceException",
    "RequestTimeout",
    "RequestTimeoutException",
];

impl CatalogError {
    /// Classify a service error code into a catalog error
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "ResourceNotFoundException" | "ResourceNotFound" | "NotFound" | "NoSuchBucket" => {
                CatalogError::NotFound(message)
            }
            "AccessDeniedException" | "AccessDenied" | "UnauthorizedOperation" | "Forbidden" => {
                CatalogError::AccessDenied(message)
            }
            "InvalidParameterValueException" | "InvalidParameterValue" | "ValidationException" => {
                CatalogError::InvalidParameter(message)
            }
            c if THROTTLING_CODES.contains(&c) => CatalogError::Throttling(message),
            c if UNAVAILABLE_CODES.contains(&c) => CatalogError::ServiceUnavailable(message),
            c => CatalogError::Other {
                code: c.to_string(),
                message,
            },
        }
    }

    /// Throttling and transient service failures
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Throttling(_) | CatalogError::ServiceUnavailable(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }

    pub fn is_throttling(&self) -> bool {
        matches!(self, CatalogError::Throttling(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        BackupError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BackupError {
    fn from(err: toml::de::Error) -> Self {
        BackupError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from HTTP client errors (artifact download)
impl From<reqwest::Error> for BackupError {
    fn from(err: reqwest::Error) -> Self {
        BackupError::Transfer(err.to_string())
    }
}
