//! Run manifest
//!
//! JSON record of one backup run, written next to the other run reports.

use crate::config::BackupConfig;
use crate::core::export::{BackupStatus, BackupSummary, ChunkOutcome, ExportError, KindSummary};
use crate::domain::{AssetKind, Result, SkipRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct BackupMetadata {
    /// Run start, RFC 3339
    pub timestamp: String,
    pub tool_version: String,
    pub aws_account_id: String,
    pub aws_region: String,
    /// Seconds
    pub total_execution_time: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestSummary {
    pub status: BackupStatus,
    pub dry_run: bool,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub chunks: usize,
    pub failed_chunks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageLocation {
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_prefix_format: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceDetails {
    pub kinds: BTreeMap<AssetKind, KindSummary>,
    pub chunks: Vec<ChunkOutcome>,
    pub skipped: Vec<SkipRecord>,
    pub errors: Vec<ExportError>,
    pub storage_location: StorageLocation,
}

/// Serializable record of a run
#[derive(Debug, Clone, Serialize)]
pub struct BackupManifest {
    pub backup_metadata: BackupMetadata,
    pub backup_summary: ManifestSummary,
    pub resource_details: ResourceDetails,
}

impl BackupManifest {
    pub fn new(config: &BackupConfig, summary: &BackupSummary) -> Self {
        Self {
            backup_metadata: BackupMetadata {
                timestamp: summary.started_at.to_rfc3339(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                aws_account_id: config.aws.account_id.clone(),
                aws_region: config.aws.region.clone(),
                total_execution_time: summary.duration.as_secs_f64(),
                success_rate: summary.success_rate(),
            },
            backup_summary: ManifestSummary {
                status: summary.status(),
                dry_run: summary.dry_run,
                processed: summary.processed,
                failed: summary.failed,
                skipped: summary.skipped.len(),
                chunks: summary.chunks.len(),
                failed_chunks: summary.failed_chunks(),
            },
            resource_details: ResourceDetails {
                kinds: summary.kinds.clone(),
                chunks: summary.chunks.clone(),
                skipped: summary.skipped.clone(),
                errors: summary.errors.clone(),
                storage_location: StorageLocation {
                    s3_bucket: config.s3.bucket_name.clone(),
                    s3_prefix: config.s3.prefix.clone(),
                    s3_prefix_format: config.s3.prefix_format.clone(),
                },
            },
        }
    }

    /// File name for a run started at the summary's start time
    pub fn file_name(summary: &BackupSummary) -> String {
        format!(
            "backup-manifest-{}.json",
            summary.started_at.format("%Y%m%d-%H%M%S")
        )
    }

    /// Write the manifest as pretty JSON into `dir`, creating it if needed
    ///
    /// # Returns
    ///
    /// The path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written.
    pub fn write_to_dir(&self, dir: &Path, file_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        tracing::info!(path = %path.display(), "Backup manifest written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetRecord;

    fn config() -> BackupConfig {
        toml::from_str(
            r#"
            [aws]
            region = "us-east-1"
            account_id = "123456789012"

            [s3]
            bucket_name = "qs-backups"
            "#,
        )
        .unwrap()
    }

    fn summary() -> BackupSummary {
        let mut summary = BackupSummary::new();
        summary.record_chunk(ChunkOutcome {
            kind: AssetKind::Dataset,
            number: 1,
            total: 1,
            assets: 3,
            job_id: Some("datasets-1700000000".to_string()),
            destination_key: Some("quicksight-backups/2025/03/07/datasets/datasets-140509.zip".to_string()),
            bytes_transferred: 2048,
            sha256: Some("ab".repeat(32)),
            success: true,
            error: None,
        });
        let skipped = AssetRecord::new(AssetKind::Datasource, "src", "arn:src", "Upload");
        summary.skipped.push(SkipRecord::for_asset(
            &skipped,
            "S3 datasource created via local manifest file upload",
        ));
        summary
    }

    #[test]
    fn test_manifest_sections() {
        let manifest = BackupManifest::new(&config(), &summary());
        let value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(value["backup_metadata"]["aws_account_id"], "123456789012");
        assert_eq!(value["backup_metadata"]["aws_region"], "us-east-1");
        assert_eq!(value["backup_summary"]["status"], "successful");
        assert_eq!(value["backup_summary"]["processed"], 3);
        assert_eq!(value["backup_summary"]["skipped"], 1);
        assert_eq!(
            value["resource_details"]["storage_location"]["s3_bucket"],
            "qs-backups"
        );
        assert_eq!(
            value["resource_details"]["skipped"][0]["resource_kind"],
            "datasource"
        );
        assert_eq!(value["resource_details"]["kinds"]["dataset"]["processed"], 3);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let summary = summary();
        let manifest = BackupManifest::new(&config(), &summary);

        let name = BackupManifest::file_name(&summary);
        assert!(name.starts_with("backup-manifest-"));
        assert!(name.ends_with(".json"));

        let path = manifest
            .write_to_dir(&dir.path().join("reports"), &name)
            .unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["backup_summary"]["chunks"], 1);
    }
}
