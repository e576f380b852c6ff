//! Backup coordinator - main orchestrator for the backup process
//!
//! Sequences selection, chunking, export and transport. Validation of every
//! kind completes before the first export job is started. Chunks of a kind
//! run through a bounded buffer and a failed chunk never aborts its
//! siblings or later kinds.

use super::chunker::{chunk, Chunk};
use super::poller::JobPoller;
use super::runner::{ExportJobRunner, ExportOptions};
use super::summary::{BackupSummary, ChunkOutcome, ExportError, ExportErrorType};
use crate::adapters::catalog::{CatalogClient, QuickSightCatalog};
use crate::adapters::download::{ArtifactFetcher, HttpArtifactFetcher};
use crate::adapters::storage::{ObjectStore, S3ObjectStore};
use crate::config::BackupConfig;
use crate::core::retry::RetryPolicy;
use crate::core::selection::AssetSelector;
use crate::core::transport::{BundleTransporter, KeyBuilder, TransferConfig};
use crate::domain::Result;
use crate::log_chunk_outcome;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Readiness of the consumed services
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrerequisiteReport {
    pub catalog_reachable: bool,
    pub catalog_error: Option<String>,
    pub bucket_reachable: bool,
    pub bucket_error: Option<String>,
}

impl PrerequisiteReport {
    pub fn is_ready(&self) -> bool {
        self.catalog_reachable && self.bucket_reachable
    }
}

/// Backup coordinator
pub struct BackupCoordinator {
    config: BackupConfig,
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn ObjectStore>,
    selector: AssetSelector,
    runner: ExportJobRunner,
    transporter: BundleTransporter,
    keys: KeyBuilder,
}

impl BackupCoordinator {
    /// Create a coordinator over the given service clients
    ///
    /// # Errors
    ///
    /// Returns an error if the selector cannot be created.
    pub fn new(
        config: BackupConfig,
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn ArtifactFetcher>,
    ) -> Result<Self> {
        let selector = AssetSelector::new(catalog.clone())?;

        let poller = JobPoller::new(catalog.clone(), config.export.poll.clone());
        let runner = ExportJobRunner::new(
            catalog.clone(),
            poller,
            RetryPolicy::from_config(&config.export.retry),
            ExportOptions::from_settings(&config.backup),
        );

        let transporter = BundleTransporter::new(
            fetcher,
            store.clone(),
            TransferConfig::from_settings(&config.transfer),
        );

        let keys = KeyBuilder::from_config(&config.s3);

        Ok(Self {
            config,
            catalog,
            store,
            selector,
            runner,
            transporter,
            keys,
        })
    }

    /// Create a coordinator backed by QuickSight, S3 and HTTP downloads
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be built.
    pub async fn from_config(config: BackupConfig) -> Result<Self> {
        let catalog = Arc::new(QuickSightCatalog::new(&config.aws).await);
        let store = Arc::new(S3ObjectStore::new(&config.aws, &config.s3).await);
        let fetcher = Arc::new(HttpArtifactFetcher::new(&config.transfer)?);

        tracing::debug!(
            region = %config.aws.region,
            account_id = %config.aws.account_id,
            bucket = %config.s3.bucket_name,
            "AWS clients created"
        );

        Self::new(config, catalog, store, fetcher)
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Probe the catalog and the destination bucket
    pub async fn check_prerequisites(&self) -> PrerequisiteReport {
        let mut report = PrerequisiteReport::default();

        match self.catalog.describe_account_settings().await {
            Ok(()) => report.catalog_reachable = true,
            Err(e) => {
                tracing::error!(error = %e, "Catalog service check failed");
                report.catalog_error = Some(e.to_string());
            }
        }

        match self.store.head_bucket().await {
            Ok(()) => report.bucket_reachable = true,
            Err(e) => {
                tracing::error!(error = %e, "Bucket check failed");
                report.bucket_error = Some(e.to_string());
            }
        }

        report
    }

    /// Execute the backup
    ///
    /// This is the main entry point for the backup process. It:
    /// 1. Discovers and validates every enabled kind
    /// 2. Records skipped assets
    /// 3. Stops here in dry-run mode
    /// 4. For each kind, in dependency order:
    ///    - Splits validated assets into chunks
    ///    - Exports and stores each chunk
    /// 5. Generates the summary
    ///
    /// Discovery failures are recorded in the summary rather than returned.
    pub async fn execute_backup(&self) -> Result<BackupSummary> {
        let start_time = Instant::now();
        let mut summary = BackupSummary::new();
        summary.dry_run = self.config.application.dry_run;

        let kinds = self.config.backup.enabled_kinds();
        if kinds.is_empty() {
            tracing::warn!("No asset kinds enabled, nothing to back up");
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        tracing::info!(kinds = ?kinds, dry_run = summary.dry_run, "Starting backup process");

        let selection = match self.selector.select(&kinds).await {
            Ok(selection) => selection,
            Err(e) => {
                tracing::error!(error = %e, "Asset discovery failed");
                summary.add_error(ExportError::new(
                    ExportErrorType::from_error(&e),
                    format!("Asset discovery failed: {e}"),
                ));
                summary = summary.with_duration(start_time.elapsed());
                summary.log_summary();
                return Ok(summary);
            }
        };

        for kind in &kinds {
            summary.record_validation(
                *kind,
                selection.inventory.get(*kind).len(),
                selection.ledger.of_kind(*kind).count(),
            );
        }
        summary.skipped = selection.ledger.into_records();

        if summary.dry_run {
            for kind in &kinds {
                tracing::info!(
                    kind = %kind,
                    assets = selection.inventory.get(*kind).len(),
                    "Dry run: would export"
                );
            }
            summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        let run_at = Utc::now();
        let concurrency = self.config.backup.max_concurrent_bundles.max(1);

        for kind in kinds {
            let assets = selection.inventory.get(kind).to_vec();
            if assets.is_empty() {
                tracing::info!(kind = %kind, "No validated assets, skipping kind");
                continue;
            }

            let chunks = match chunk(kind, assets, self.config.backup.max_assets_per_bundle) {
                Ok(chunks) => chunks,
                Err(e) => {
                    summary.add_error(
                        ExportError::new(ExportErrorType::Configuration, e.to_string())
                            .with_context(format!("kind={kind}")),
                    );
                    continue;
                }
            };

            tracing::info!(kind = %kind, chunks = chunks.len(), concurrency, "Exporting kind");

            let outcomes: Vec<ChunkOutcome> = stream::iter(chunks)
                .map(|c| self.process_chunk(c, run_at))
                .buffered(concurrency)
                .collect()
                .await;

            for outcome in outcomes {
                summary.record_chunk(outcome);
            }
        }

        summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }

    /// Export and store one chunk
    async fn process_chunk(&self, chunk: Chunk, run_at: DateTime<Utc>) -> ChunkOutcome {
        let key = self.keys.key(chunk.kind, chunk.number, chunk.total, &run_at);
        let mut outcome = ChunkOutcome {
            kind: chunk.kind,
            number: chunk.number,
            total: chunk.total,
            assets: chunk.len(),
            job_id: None,
            destination_key: None,
            bytes_transferred: 0,
            sha256: None,
            success: false,
            error: None,
        };

        match self.runner.run(&chunk).await {
            Ok(export) => {
                outcome.job_id = Some(export.job_id.clone());
                match self.transporter.transfer(&export.download_url, &key).await {
                    Ok(result) => {
                        outcome.success = result.success;
                        outcome.bytes_transferred = result.bytes_transferred;
                        outcome.destination_key = Some(result.destination_key);
                        outcome.sha256 = Some(result.sha256);
                    }
                    Err(e) => {
                        tracing::error!(job_id = %export.job_id, key = %key, error = %e, "Bundle transfer failed");
                        outcome.error = Some(format!("Transfer failed: {e}"));
                    }
                }
            }
            Err(e) => {
                tracing::error!(kind = %chunk.kind, chunk = chunk.number, error = %e, "Export failed");
                outcome.error = Some(format!("Export failed: {e}"));
            }
        }

        log_chunk_outcome!(chunk.kind, chunk.number, chunk.len(), outcome.success);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerequisite_report_ready() {
        let mut report = PrerequisiteReport::default();
        assert!(!report.is_ready());

        report.catalog_reachable = true;
        assert!(!report.is_ready());

        report.bucket_reachable = true;
        assert!(report.is_ready());
    }
}
