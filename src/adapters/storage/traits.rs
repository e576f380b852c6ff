//! Object storage abstraction

use crate::domain::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// One uploaded part of a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// 1-based part number
    pub part_number: i32,
    pub etag: String,
}

/// Bucket-scoped object storage operations
///
/// The bucket and the encryption settings are fixed by the implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check that the destination bucket exists and is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket does not exist or access is denied.
    async fn head_bucket(&self) -> Result<()>;

    /// Upload a local file as a single object
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    async fn put_object(
        &self,
        key: &str,
        path: &Path,
        metadata: &HashMap<String, String>,
    ) -> Result<()>;

    /// Start a multipart upload
    ///
    /// # Returns
    ///
    /// The upload id used by the subsequent part, complete and abort calls.
    async fn create_multipart_upload(
        &self,
        key: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<String>;

    /// Upload one part
    ///
    /// # Returns
    ///
    /// The entity tag of the stored part.
    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> Result<String>;

    /// Assemble the uploaded parts, listed in ascending part number order
    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<()>;

    /// Discard an in-progress multipart upload and its stored parts
    async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> Result<()>;
}
