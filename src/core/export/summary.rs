//! Backup summary and reporting
//!
//! This module defines structures for tracking and reporting backup results.

use crate::domain::{AssetKind, BackupError, SkipRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupStatus {
    /// No chunk failed
    Successful,
    /// Some assets were stored and some failed
    Partial,
    /// Nothing was stored and something failed
    Failed,
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupStatus::Successful => f.write_str("successful"),
            BackupStatus::Partial => f.write_str("partial"),
            BackupStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Per-kind counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub validated: usize,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub chunks: usize,
}

/// Result of one chunk's export and transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkOutcome {
    pub kind: AssetKind,
    pub number: usize,
    pub total: usize,
    pub assets: usize,
    pub job_id: Option<String>,
    pub destination_key: Option<String>,
    pub bytes_transferred: u64,
    pub sha256: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

/// Summary of a backup run
#[derive(Debug, Clone)]
pub struct BackupSummary {
    /// Assets whose chunk was exported and stored
    pub processed: usize,

    /// Assets whose chunk failed at any step
    pub failed: usize,

    /// Assets excluded by dependency validation
    pub skipped: Vec<SkipRecord>,

    pub kinds: BTreeMap<AssetKind, KindSummary>,

    pub chunks: Vec<ChunkOutcome>,

    /// Errors encountered during the run
    pub errors: Vec<ExportError>,

    pub started_at: DateTime<Utc>,

    pub duration: Duration,

    /// Discovery and validation only, no export jobs started
    pub dry_run: bool,
}

impl BackupSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self {
            processed: 0,
            failed: 0,
            skipped: Vec::new(),
            kinds: BTreeMap::new(),
            chunks: Vec::new(),
            errors: Vec::new(),
            started_at: Utc::now(),
            duration: Duration::from_secs(0),
            dry_run: false,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Record validation results for one kind
    pub fn record_validation(&mut self, kind: AssetKind, validated: usize, skipped: usize) {
        let entry = self.kinds.entry(kind).or_default();
        entry.validated = validated;
        entry.skipped = skipped;
    }

    /// Record the outcome of one chunk
    ///
    /// A chunk counts all its assets as processed only when both export and
    /// transfer succeeded. Otherwise all of them count as failed.
    pub fn record_chunk(&mut self, outcome: ChunkOutcome) {
        let entry = self.kinds.entry(outcome.kind).or_default();
        entry.chunks += 1;
        if outcome.success {
            entry.processed += outcome.assets;
            self.processed += outcome.assets;
        } else {
            entry.failed += outcome.assets;
            self.failed += outcome.assets;
            self.add_error(
                ExportError::new(
                    ExportErrorType::Chunk,
                    outcome
                        .error
                        .clone()
                        .unwrap_or_else(|| "Chunk failed".to_string()),
                )
                .with_context(format!(
                    "kind={} chunk={}/{}",
                    outcome.kind, outcome.number, outcome.total
                )),
            );
        }
        self.chunks.push(outcome);
    }

    pub fn failed_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| !c.success).count()
    }

    /// Overall status of the run
    pub fn status(&self) -> BackupStatus {
        if self.failed == 0 && self.errors.is_empty() {
            BackupStatus::Successful
        } else if self.processed > 0 {
            BackupStatus::Partial
        } else {
            BackupStatus::Failed
        }
    }

    /// Check if the run was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.status() == BackupStatus::Successful
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.processed + self.failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.processed as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            status = %self.status(),
            processed = self.processed,
            failed = self.failed,
            skipped = self.skipped.len(),
            chunks = self.chunks.len(),
            failed_chunks = self.failed_chunks(),
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Backup completed"
        );

        for (kind, counts) in &self.kinds {
            tracing::info!(
                kind = %kind,
                validated = counts.validated,
                processed = counts.processed,
                failed = counts.failed,
                skipped = counts.skipped,
                "Kind summary"
            );
        }

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Backup completed with errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = ?error.context,
                    "Backup error"
                );
            }
        }
    }
}

impl Default for BackupSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of backup error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportErrorType {
    /// Listing or validation could not complete
    Discovery,
    /// A chunk failed during export or transfer
    Chunk,
    /// Configuration error
    Configuration,
    /// Manifest or report could not be written
    Report,
    /// Unknown error
    Unknown,
}

impl ExportErrorType {
    /// Classify a run-level error
    pub fn from_error(err: &BackupError) -> Self {
        match err {
            BackupError::Configuration(_) | BackupError::Validation(_) => {
                ExportErrorType::Configuration
            }
            BackupError::Catalog(_) => ExportErrorType::Discovery,
            BackupError::Io(_) | BackupError::Serialization(_) => ExportErrorType::Report,
            _ => ExportErrorType::Unknown,
        }
    }
}

/// Backup error with context
#[derive(Debug, Clone, Serialize)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., kind and chunk number)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: AssetKind, number: usize, assets: usize, success: bool) -> ChunkOutcome {
        ChunkOutcome {
            kind,
            number,
            total: 3,
            assets,
            job_id: Some(format!("{kind}-bundle-{number}-1700000000")),
            destination_key: success.then(|| format!("backups/{kind}/{number}.zip")),
            bytes_transferred: if success { 1024 } else { 0 },
            sha256: None,
            success,
            error: (!success).then(|| "Export job failed".to_string()),
        }
    }

    #[test]
    fn test_summary_creation() {
        let summary = BackupSummary::new();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.skipped.is_empty());
        assert!(summary.errors.is_empty());
        assert_eq!(summary.status(), BackupStatus::Successful);
        assert_eq!(summary.success_rate(), 100.0);
    }

    #[test]
    fn test_summary_with_duration() {
        let summary = BackupSummary::new().with_duration(Duration::from_secs(120));
        assert_eq!(summary.duration, Duration::from_secs(120));
    }

    #[test]
    fn test_chunk_accounting_partial() {
        let mut summary = BackupSummary::new();
        summary.record_chunk(outcome(AssetKind::Dataset, 1, 50, true));
        summary.record_chunk(outcome(AssetKind::Dataset, 2, 50, false));
        summary.record_chunk(outcome(AssetKind::Dataset, 3, 20, true));

        assert_eq!(summary.processed, 70);
        assert_eq!(summary.failed, 50);
        assert_eq!(summary.failed_chunks(), 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].error_type, ExportErrorType::Chunk);
        assert_eq!(summary.status(), BackupStatus::Partial);

        let datasets = &summary.kinds[&AssetKind::Dataset];
        assert_eq!(datasets.chunks, 3);
        assert_eq!(datasets.processed, 70);
        assert_eq!(datasets.failed, 50);
    }

    #[test]
    fn test_all_chunks_failed() {
        let mut summary = BackupSummary::new();
        summary.record_chunk(outcome(AssetKind::Analysis, 1, 10, false));

        assert_eq!(summary.status(), BackupStatus::Failed);
        assert_eq!(summary.success_rate(), 0.0);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_run_level_error_without_assets_fails() {
        let mut summary = BackupSummary::new();
        summary.add_error(ExportError::new(
            ExportErrorType::Discovery,
            "listing failed".to_string(),
        ));

        assert_eq!(summary.status(), BackupStatus::Failed);
    }

    #[test]
    fn test_record_validation() {
        let mut summary = BackupSummary::new();
        summary.record_validation(AssetKind::Datasource, 4, 1);

        let counts = &summary.kinds[&AssetKind::Datasource];
        assert_eq!(counts.validated, 4);
        assert_eq!(counts.skipped, 1);
    }

    #[test]
    fn test_export_error_with_context() {
        let error = ExportError::new(ExportErrorType::Chunk, "Job failed".to_string())
            .with_context("kind=datasets chunk=2/3".to_string());

        assert_eq!(error.error_type, ExportErrorType::Chunk);
        assert_eq!(error.context, Some("kind=datasets chunk=2/3".to_string()));
    }

    #[test]
    fn test_error_type_classification() {
        let err = BackupError::Catalog(crate::domain::CatalogError::AccessDenied("x".into()));
        assert_eq!(ExportErrorType::from_error(&err), ExportErrorType::Discovery);
        assert_eq!(
            ExportErrorType::from_error(&BackupError::Configuration("x".into())),
            ExportErrorType::Configuration
        );
    }
}
