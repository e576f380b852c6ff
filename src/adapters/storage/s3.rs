//! S3 implementation of [`ObjectStore`]

use super::traits::{CompletedPart, ObjectStore};
use crate::adapters::aws::{load_sdk_config, sdk_error_parts};
use crate::config::{AwsConfig, S3Config};
use crate::domain::{BackupError, Result};
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart as S3CompletedPart, ServerSideEncryption};
use std::collections::HashMap;
use std::path::Path;

fn storage_error<E, R>(operation: &str, key: &str, err: SdkError<E, R>) -> BackupError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let (code, message) = sdk_error_parts(&err);
    BackupError::Storage(format!("{operation} failed for '{key}': {code}: {message}"))
}

/// Object store bound to one S3 bucket
pub struct S3ObjectStore {
    client: s3::Client,
    bucket: String,
    server_side_encryption: ServerSideEncryption,
}

impl S3ObjectStore {
    /// Create a store for the configured bucket
    pub async fn new(aws: &AwsConfig, config: &S3Config) -> Self {
        let sdk_config = load_sdk_config(aws, &aws.region).await;
        Self::from_client(s3::Client::new(&sdk_config), config)
    }

    /// Wrap an existing SDK client
    pub fn from_client(client: s3::Client, config: &S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket_name.clone(),
            server_side_encryption: ServerSideEncryption::from(
                config.server_side_encryption.as_str(),
            ),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head_bucket(&self) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| storage_error("HeadBucket", &self.bucket, e))?;
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        path: &Path,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let body = ByteStream::from_path(path).await.map_err(|e| {
            BackupError::Transfer(format!("Failed to read spool file {}: {e}", path.display()))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .server_side_encryption(self.server_side_encryption.clone())
            .set_metadata(Some(metadata.clone()))
            .send()
            .await
            .map_err(|e| storage_error("PutObject", key, e))?;

        tracing::debug!(bucket = %self.bucket, key, "Object stored");
        Ok(())
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<String> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .server_side_encryption(self.server_side_encryption.clone())
            .set_metadata(Some(metadata.clone()))
            .send()
            .await
            .map_err(|e| storage_error("CreateMultipartUpload", key, e))?;

        output.upload_id().map(str::to_string).ok_or_else(|| {
            BackupError::Storage(format!("CreateMultipartUpload returned no upload id for '{key}'"))
        })
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> Result<String> {
        let output = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| storage_error("UploadPart", key, e))?;

        output.e_tag().map(str::to_string).ok_or_else(|| {
            BackupError::Storage(format!("UploadPart {part_number} returned no ETag for '{key}'"))
        })
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<()> {
        let parts = parts
            .iter()
            .map(|p| {
                S3CompletedPart::builder()
                    .e_tag(&p.etag)
                    .part_number(p.part_number)
                    .build()
            })
            .collect();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| storage_error("CompleteMultipartUpload", key, e))?;

        Ok(())
    }

    async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> Result<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| storage_error("AbortMultipartUpload", key, e))?;

        tracing::info!(bucket = %self.bucket, key, upload_id, "Multipart upload aborted");
        Ok(())
    }
}
