//! Bundle transport
//!
//! Streams a completed export artifact into a transient spool file, then
//! stores it with a single upload or a multipart upload depending on its
//! size. The spool file is removed on every exit path and a failed
//! multipart upload is aborted before the error is returned.

use crate::adapters::download::ArtifactFetcher;
use crate::adapters::storage::{CompletedPart, ObjectStore};
use crate::config::TransferSettings;
use crate::domain::{BackupError, Result};
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt, BufWriter};

/// Tool identity stored in object metadata
pub const BACKUP_TOOL: &str = "quicksight-backup";

/// Backup type stored in object metadata
pub const BACKUP_TYPE: &str = "asset-bundle";

/// Size thresholds and spool location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Artifacts at or above this size use multipart upload
    pub multipart_threshold: u64,
    pub part_size: u64,
    pub spool_dir: Option<PathBuf>,
}

impl TransferConfig {
    pub fn from_settings(settings: &TransferSettings) -> Self {
        Self {
            multipart_threshold: settings.multipart_threshold_bytes(),
            part_size: settings.part_size_bytes(),
            spool_dir: settings.spool_dir.clone(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::from_settings(&TransferSettings::default())
    }
}

/// Outcome of one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub success: bool,
    pub bytes_transferred: u64,
    pub destination_key: String,

    /// Hex SHA-256 of the stored artifact
    pub sha256: String,
}

/// Byte range of one multipart part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 1-based part number
    pub number: i32,
    pub offset: u64,
    pub len: u64,
}

/// Split `size` bytes into consecutive parts of `part_size` bytes
///
/// ```
/// use quicksight_backup::core::transport::plan_parts;
///
/// const MB: u64 = 1024 * 1024;
/// let parts = plan_parts(250 * MB, 100 * MB);
/// let lens: Vec<u64> = parts.iter().map(|p| p.len / MB).collect();
/// assert_eq!(lens, vec![100, 100, 50]);
/// ```
pub fn plan_parts(size: u64, part_size: u64) -> Vec<PartRange> {
    let part_size = part_size.max(1);
    let mut parts = Vec::new();
    let mut offset = 0;
    let mut number = 1;

    while offset < size {
        let len = part_size.min(size - offset);
        parts.push(PartRange {
            number,
            offset,
            len,
        });
        offset += len;
        number += 1;
    }

    parts
}

/// Provenance metadata attached to every stored bundle
pub fn provenance_metadata(sha256: &str) -> HashMap<String, String> {
    HashMap::from([
        ("backup-tool".to_string(), BACKUP_TOOL.to_string()),
        ("backup-type".to_string(), BACKUP_TYPE.to_string()),
        (
            "backup-timestamp".to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        ("backup-sha256".to_string(), sha256.to_string()),
    ])
}

/// Writer that hashes everything passing through it
struct DigestWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: AsyncWrite + Unpin> DigestWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    fn finish(self) -> (W, String) {
        (self.inner, format!("{:x}", self.hasher.finalize()))
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for DigestWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(Ok(n)) => {
                this.hasher.update(&buf[..n]);
                Poll::Ready(Ok(n))
            }
            other => other,
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Moves export artifacts into object storage
pub struct BundleTransporter {
    fetcher: Arc<dyn ArtifactFetcher>,
    store: Arc<dyn ObjectStore>,
    config: TransferConfig,
}

impl BundleTransporter {
    pub fn new(
        fetcher: Arc<dyn ArtifactFetcher>,
        store: Arc<dyn ObjectStore>,
        config: TransferConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            config,
        }
    }

    /// Download the artifact at `url` and store it under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the download, the spool file or the upload fails.
    pub async fn transfer(&self, url: &str, key: &str) -> Result<TransferResult> {
        let spool = self.create_spool()?;
        let (size, sha256) = self.spool_artifact(url, &spool).await?;

        let metadata = provenance_metadata(&sha256);
        let multipart = size >= self.config.multipart_threshold;

        tracing::info!(key, bytes = size, multipart, "Uploading bundle");

        if multipart {
            self.upload_multipart(key, spool.path(), size, &metadata)
                .await?;
        } else {
            self.store.put_object(key, spool.path(), &metadata).await?;
        }

        if let Err(e) = spool.close() {
            tracing::warn!(error = %e, "Failed to remove spool file");
        }

        Ok(TransferResult {
            success: true,
            bytes_transferred: size,
            destination_key: key.to_string(),
            sha256,
        })
    }

    fn create_spool(&self) -> Result<NamedTempFile> {
        let spool = match &self.config.spool_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        };
        spool.map_err(|e| BackupError::Transfer(format!("Failed to create spool file: {e}")))
    }

    async fn spool_artifact(&self, url: &str, spool: &NamedTempFile) -> Result<(u64, String)> {
        let file = tokio::fs::File::from_std(spool.reopen()?);
        let mut writer = DigestWriter::new(BufWriter::new(file));

        let size = self.fetcher.fetch_to(url, &mut writer).await?;
        writer.flush().await?;

        let (mut inner, sha256) = writer.finish();
        inner.shutdown().await?;

        tracing::debug!(bytes = size, sha256 = %sha256, "Artifact spooled");
        Ok((size, sha256))
    }

    async fn upload_multipart(
        &self,
        key: &str,
        path: &Path,
        size: u64,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let upload_id = self.store.create_multipart_upload(key, metadata).await?;

        match self.upload_parts(key, &upload_id, path, size).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(key, upload_id = %upload_id, error = %e, "Multipart upload failed, aborting");
                if let Err(abort_err) = self.store.abort_multipart_upload(key, &upload_id).await {
                    tracing::warn!(key, upload_id = %upload_id, error = %abort_err, "Abort failed");
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(&self, key: &str, upload_id: &str, path: &Path, size: u64) -> Result<()> {
        let mut file = tokio::fs::File::open(path).await?;
        let parts = plan_parts(size, self.config.part_size);
        let mut completed = Vec::with_capacity(parts.len());

        for part in parts {
            let len = usize::try_from(part.len).map_err(|_| {
                BackupError::Transfer(format!("Part size {} exceeds addressable memory", part.len))
            })?;
            let mut body = vec![0u8; len];
            file.seek(SeekFrom::Start(part.offset)).await?;
            file.read_exact(&mut body).await?;

            let etag = self
                .store
                .upload_part(key, upload_id, part.number, body)
                .await?;
            tracing::debug!(key, part = part.number, bytes = part.len, "Part uploaded");

            completed.push(CompletedPart {
                part_number: part.number,
                etag,
            });
        }

        self.store
            .complete_multipart_upload(key, upload_id, &completed)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_plan_parts_250mb() {
        let parts = plan_parts(250 * MB, 100 * MB);

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], PartRange { number: 1, offset: 0, len: 100 * MB });
        assert_eq!(parts[1], PartRange { number: 2, offset: 100 * MB, len: 100 * MB });
        assert_eq!(parts[2], PartRange { number: 3, offset: 200 * MB, len: 50 * MB });
    }

    #[test]
    fn test_plan_parts_exact_multiple() {
        let parts = plan_parts(200 * MB, 100 * MB);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].len, 100 * MB);
    }

    #[test]
    fn test_plan_parts_empty() {
        assert!(plan_parts(0, 100 * MB).is_empty());
    }

    #[test]
    fn test_provenance_metadata() {
        let metadata = provenance_metadata("abc123");

        assert_eq!(metadata["backup-tool"], "quicksight-backup");
        assert_eq!(metadata["backup-type"], "asset-bundle");
        assert_eq!(metadata["backup-sha256"], "abc123");
        assert!(metadata["backup-timestamp"].ends_with('Z'));
    }

    #[tokio::test]
    async fn test_digest_writer_hashes_written_bytes() {
        let mut writer = DigestWriter::new(Vec::new());
        writer.write_all(b"hello").await.unwrap();
        writer.flush().await.unwrap();

        let (inner, sha256) = writer.finish();
        assert_eq!(inner, b"hello");
        assert_eq!(
            sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_transfer_config_from_settings() {
        let config = TransferConfig::default();
        assert_eq!(config.multipart_threshold, 100 * MB);
        assert_eq!(config.part_size, 100 * MB);
        assert!(config.spool_dir.is_none());
    }
}
