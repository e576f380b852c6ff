//! Catalog service abstraction
//!
//! The pipeline talks to the BI catalog only through [`CatalogClient`], so
//! discovery, validation and export can run against in-memory fakes.

use crate::domain::{AssetRecord, CatalogError};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Result of a catalog call
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// A dataset as returned by the list operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSetListing {
    pub asset: AssetRecord,

    /// Storage mode, e.g. `SPICE`, `DIRECT_QUERY`
    pub import_mode: Option<String>,
}

/// Detailed configuration of a data source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSourceDescription {
    pub arn: String,

    /// Service type, e.g. `S3`, `ATHENA`
    pub source_type: Option<String>,

    /// Whether structured object-storage connection parameters are present
    pub has_s3_parameters: bool,

    /// Private network connection, if any
    pub vpc_connection_arn: Option<String>,
}

/// Detailed configuration of a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSetDescription {
    pub arn: String,

    /// Data source ARNs referenced by physical table definitions
    pub data_source_arns: Vec<String>,
}

/// Detailed configuration of an analysis or dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportDescription {
    pub arn: String,

    /// Datasets referenced directly by the resource
    pub data_set_arns: Vec<String>,

    /// Datasets declared by the resource definition
    pub declared_data_set_arns: Vec<String>,

    pub theme_arn: Option<String>,
}

impl ReportDescription {
    /// Direct and declared dataset ARNs, deduplicated in first-seen order
    pub fn all_data_set_arns(&self) -> Vec<String> {
        let mut arns: Vec<String> = Vec::new();
        for arn in self
            .data_set_arns
            .iter()
            .chain(self.declared_data_set_arns.iter())
        {
            if !arn.is_empty() && !arns.contains(arn) {
                arns.push(arn.clone());
            }
        }
        arns
    }
}

/// Request for an asynchronous bundle export job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportJobRequest {
    pub job_id: String,
    pub resource_arns: Vec<String>,
    pub export_format: String,
    pub include_all_dependencies: bool,
    pub include_permissions: bool,
    pub include_tags: bool,
}

/// Export job status as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportJobStatus {
    Queued,
    InProgress,
    Successful,
    Failed,
    Unknown(String),
}

impl ExportJobStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "QUEUED_FOR_IMMEDIATE_EXECUTION" | "QUEUED" => ExportJobStatus::Queued,
            "IN_PROGRESS" => ExportJobStatus::InProgress,
            "SUCCESSFUL" => ExportJobStatus::Successful,
            "FAILED" => ExportJobStatus::Failed,
            other => ExportJobStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportJobStatus::Successful | ExportJobStatus::Failed)
    }
}

impl fmt::Display for ExportJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportJobStatus::Queued => f.write_str("QUEUED_FOR_IMMEDIATE_EXECUTION"),
            ExportJobStatus::InProgress => f.write_str("IN_PROGRESS"),
            ExportJobStatus::Successful => f.write_str("SUCCESSFUL"),
            ExportJobStatus::Failed => f.write_str("FAILED"),
            ExportJobStatus::Unknown(s) => f.write_str(s),
        }
    }
}

/// Observed state of an export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub job_id: String,
    pub status: ExportJobStatus,

    /// Artifact location, present once the job succeeded
    pub download_url: Option<String>,

    /// Error messages reported for a failed job
    pub errors: Vec<String>,
}

/// Catalog client trait
///
/// Implementations classify service failures into [`CatalogError`] so that
/// callers can apply the not-found / access-denied / throttling policies.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// List all data sources in the account
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the listing fails.
    async fn list_data_sources(&self) -> CatalogResult<Vec<AssetRecord>>;

    /// List all datasets with their storage mode
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the listing fails.
    async fn list_data_sets(&self) -> CatalogResult<Vec<DataSetListing>>;

    /// List all analyses
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the listing fails.
    async fn list_analyses(&self) -> CatalogResult<Vec<AssetRecord>>;

    /// List all dashboards
    ///
    /// # Errors
    ///
    /// Returns an error if any page of the listing fails.
    async fn list_dashboards(&self) -> CatalogResult<Vec<AssetRecord>>;

    /// Describe a data source
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the data source does not exist.
    async fn describe_data_source(&self, data_source_id: &str)
        -> CatalogResult<DataSourceDescription>;

    /// Describe a dataset, including its physical table references
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidParameter`] if the service refuses to
    /// describe the dataset, or [`CatalogError::NotFound`] if it is gone.
    async fn describe_data_set(&self, data_set_id: &str) -> CatalogResult<DataSetDescription>;

    /// Describe an analysis, merging definition-declared datasets
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the analysis does not exist.
    async fn describe_analysis(&self, analysis_id: &str) -> CatalogResult<ReportDescription>;

    /// Describe a dashboard, merging definition-declared datasets
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the dashboard does not exist.
    async fn describe_dashboard(&self, dashboard_id: &str) -> CatalogResult<ReportDescription>;

    /// Check that a theme exists
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the theme does not exist.
    async fn describe_theme(&self, theme_id: &str) -> CatalogResult<()>;

    /// Start an asynchronous bundle export job
    ///
    /// # Returns
    ///
    /// The job id accepted by the service.
    async fn start_export_job(&self, request: &ExportJobRequest) -> CatalogResult<String>;

    /// Observe the current state of an export job
    async fn describe_export_job(&self, job_id: &str) -> CatalogResult<ExportJob>;

    /// Lightweight readiness probe against the account
    async fn describe_account_settings(&self) -> CatalogResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_job_status_parse() {
        assert_eq!(
            ExportJobStatus::parse("QUEUED_FOR_IMMEDIATE_EXECUTION"),
            ExportJobStatus::Queued
        );
        assert_eq!(
            ExportJobStatus::parse("IN_PROGRESS"),
            ExportJobStatus::InProgress
        );
        assert!(ExportJobStatus::parse("SUCCESSFUL").is_terminal());
        assert!(ExportJobStatus::parse("FAILED").is_terminal());
        assert!(!ExportJobStatus::parse("PAUSED").is_terminal());
        assert_eq!(ExportJobStatus::parse("PAUSED").to_string(), "PAUSED");
    }

    #[test]
    fn test_all_data_set_arns_dedup() {
        let description = ReportDescription {
            arn: "arn:analysis".to_string(),
            data_set_arns: vec!["arn:a".to_string(), "arn:b".to_string()],
            declared_data_set_arns: vec!["arn:b".to_string(), "arn:c".to_string()],
            theme_arn: None,
        };

        assert_eq!(
            description.all_data_set_arns(),
            vec!["arn:a".to_string(), "arn:b".to_string(), "arn:c".to_string()]
        );
    }
}
