//! Export job runner
//!
//! Starts one export job per chunk and waits for it to finish. Submission
//! and polling each run inside the shared retry envelope, so throttling is
//! absorbed with backoff while every other error fails the chunk at once.

use super::chunker::Chunk;
use super::poller::JobPoller;
use crate::adapters::catalog::{CatalogClient, ExportJobRequest, ExportJobStatus};
use crate::config::BackupSettings;
use crate::core::retry::RetryPolicy;
use crate::domain::{BackupError, Result};
use std::sync::Arc;

/// Flags and format sent with every export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub export_format: String,
    pub include_all_dependencies: bool,
    pub include_permissions: bool,
    pub include_tags: bool,
}

impl ExportOptions {
    pub fn from_settings(settings: &BackupSettings) -> Self {
        Self {
            export_format: settings.export_format.clone(),
            include_all_dependencies: settings.include_dependencies,
            include_permissions: settings.include_permissions,
            include_tags: settings.include_tags,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_settings(&BackupSettings::default())
    }
}

/// A job that finished successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedExport {
    pub job_id: String,
    pub download_url: String,
}

/// Job id for a chunk, unique within a run
///
/// `{kind}-bundle-{n}-{timestamp}` when the kind has several chunks,
/// otherwise `{kind}-{timestamp}`.
pub fn job_id_for(chunk: &Chunk, timestamp: i64) -> String {
    if chunk.total > 1 {
        format!("{}-bundle-{}-{timestamp}", chunk.kind, chunk.number)
    } else {
        format!("{}-{timestamp}", chunk.kind)
    }
}

/// Drives export jobs to completion
pub struct ExportJobRunner {
    catalog: Arc<dyn CatalogClient>,
    poller: JobPoller,
    policy: RetryPolicy,
    options: ExportOptions,
}

impl ExportJobRunner {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        poller: JobPoller,
        policy: RetryPolicy,
        options: ExportOptions,
    ) -> Self {
        Self {
            catalog,
            poller,
            policy,
            options,
        }
    }

    /// Build the job request for a chunk
    pub fn request_for(&self, chunk: &Chunk, job_id: String) -> ExportJobRequest {
        ExportJobRequest {
            job_id,
            resource_arns: chunk.resource_arns(),
            export_format: self.options.export_format.clone(),
            include_all_dependencies: self.options.include_all_dependencies,
            include_permissions: self.options.include_permissions,
            include_tags: self.options.include_tags,
        }
    }

    /// Export a chunk and return the artifact location
    ///
    /// # Errors
    ///
    /// - retryable catalog errors once the attempt bound is exhausted
    /// - any non-retryable catalog error on submission or polling
    /// - [`BackupError::JobTimeout`] and [`BackupError::JobNotFound`] from polling
    /// - [`BackupError::Export`] if the job fails or reports no download URL
    pub async fn run(&self, chunk: &Chunk) -> Result<CompletedExport> {
        let request = self.request_for(chunk, job_id_for(chunk, chrono::Utc::now().timestamp()));

        tracing::info!(
            kind = %chunk.kind,
            chunk = chunk.number,
            total = chunk.total,
            assets = chunk.len(),
            job_id = %request.job_id,
            "Starting export job"
        );

        let catalog = &self.catalog;
        let request_ref = &request;
        let job_id = self
            .policy
            .run("start_export_job", BackupError::is_retryable, move |_| async move {
                catalog
                    .start_export_job(request_ref)
                    .await
                    .map_err(BackupError::from)
            })
            .await?;

        // Retries after a throttled observation share one deadline and schedule
        let poller = &self.poller;
        let window = poller.window();
        let window_ref = &window;
        let job_id_ref = job_id.as_str();
        let job = self
            .policy
            .run("poll_export_job", BackupError::is_retryable, move |_| {
                poller.wait_within(job_id_ref, window_ref)
            })
            .await?;

        match job.status {
            ExportJobStatus::Successful => {
                let download_url = job.download_url.ok_or_else(|| {
                    BackupError::Export(format!(
                        "Export job {job_id} succeeded without a download URL"
                    ))
                })?;
                Ok(CompletedExport {
                    job_id,
                    download_url,
                })
            }
            ExportJobStatus::Failed => {
                let detail = if job.errors.is_empty() {
                    "no error details reported".to_string()
                } else {
                    job.errors.join("; ")
                };
                Err(BackupError::Export(format!(
                    "Export job {job_id} failed: {detail}"
                )))
            }
            other => Err(BackupError::Export(format!(
                "Export job {job_id} ended in unexpected state {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetKind, AssetRecord};

    fn chunk(number: usize, total: usize) -> Chunk {
        Chunk {
            kind: AssetKind::Dashboard,
            number,
            total,
            assets: vec![AssetRecord::new(
                AssetKind::Dashboard,
                "d1",
                "arn:aws:quicksight:us-east-1:123456789012:dashboard/d1",
                "Sales",
            )],
        }
    }

    #[test]
    fn test_job_id_multiple_chunks() {
        assert_eq!(
            job_id_for(&chunk(2, 3), 1_700_000_000),
            "dashboards-bundle-2-1700000000"
        );
    }

    #[test]
    fn test_job_id_single_chunk() {
        assert_eq!(job_id_for(&chunk(1, 1), 1_700_000_000), "dashboards-1700000000");
    }

    #[test]
    fn test_export_options_from_settings() {
        let settings = BackupSettings {
            include_tags: false,
            export_format: "CLOUDFORMATION_JSON".to_string(),
            ..BackupSettings::default()
        };
        let options = ExportOptions::from_settings(&settings);

        assert_eq!(options.export_format, "CLOUDFORMATION_JSON");
        assert!(options.include_all_dependencies);
        assert!(options.include_permissions);
        assert!(!options.include_tags);
    }
}
