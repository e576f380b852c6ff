//! In-memory fakes for the catalog, object store and artifact fetcher

#![allow(dead_code)]

use async_trait::async_trait;
use quicksight_backup::adapters::catalog::{
    CatalogClient, CatalogResult, DataSetDescription, DataSetListing, DataSourceDescription,
    ExportJob, ExportJobRequest, ExportJobStatus, ReportDescription,
};
use quicksight_backup::adapters::download::ArtifactFetcher;
use quicksight_backup::adapters::storage::{CompletedPart, ObjectStore};
use quicksight_backup::config::BackupConfig;
use quicksight_backup::domain::{AssetKind, AssetRecord, BackupError, CatalogError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const ACCOUNT: &str = "123456789012";

pub fn arn(kind: &str, id: &str) -> String {
    format!("arn:aws:quicksight:us-east-1:{ACCOUNT}:{kind}/{id}")
}

pub fn data_source(id: &str) -> AssetRecord {
    AssetRecord::new(AssetKind::Datasource, id, arn("datasource", id), id)
}

pub fn data_set(id: &str, import_mode: &str) -> DataSetListing {
    DataSetListing {
        asset: AssetRecord::new(AssetKind::Dataset, id, arn("dataset", id), id),
        import_mode: Some(import_mode.to_string()),
    }
}

pub fn analysis(id: &str) -> AssetRecord {
    AssetRecord::new(AssetKind::Analysis, id, arn("analysis", id), id)
}

pub fn dashboard(id: &str) -> AssetRecord {
    AssetRecord::new(AssetKind::Dashboard, id, arn("dashboard", id), id)
}

/// Config with small retry and poll intervals
pub fn test_config(bucket: &str) -> BackupConfig {
    toml::from_str(&format!(
        r#"
        [aws]
        region = "us-east-1"
        account_id = "{ACCOUNT}"

        [s3]
        bucket_name = "{bucket}"

        [export.retry]
        max_attempts = 6
        base_delay_ms = 100
        max_delay_ms = 1000

        [export.poll]
        initial_interval_secs = 1
        backoff_multiplier = 1.5
        max_wait_secs = 60

        [logging]
        local_enabled = false
        "#
    ))
    .expect("test config must parse")
}

/// Scriptable catalog
///
/// Descriptions default to an empty, valid description when no entry was
/// registered. Export jobs succeed unless their id contains one of the
/// `failing_jobs` markers.
#[derive(Default)]
pub struct FakeCatalog {
    pub data_sources: Vec<AssetRecord>,
    pub data_sets: Vec<DataSetListing>,
    pub analyses: Vec<AssetRecord>,
    pub dashboards: Vec<AssetRecord>,

    pub source_descriptions: HashMap<String, CatalogResult<DataSourceDescription>>,
    pub data_set_descriptions: HashMap<String, CatalogResult<DataSetDescription>>,
    pub analysis_descriptions: HashMap<String, CatalogResult<ReportDescription>>,
    pub dashboard_descriptions: HashMap<String, CatalogResult<ReportDescription>>,
    pub missing_themes: HashSet<String>,
    pub list_error: Option<CatalogError>,
    pub account_error: Option<CatalogError>,

    /// Errors returned by successive start calls before they succeed
    pub start_failures: Mutex<VecDeque<CatalogError>>,

    /// Observations returned by successive describe calls before the
    /// terminal one
    pub poll_script: Mutex<VecDeque<CatalogResult<ExportJobStatus>>>,

    /// Job ids containing one of these markers end `FAILED`
    pub failing_jobs: Vec<String>,

    pub started: Mutex<Vec<ExportJobRequest>>,
    pub start_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    pub source_describe_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_failures(self, failures: Vec<CatalogError>) -> Self {
        *self.start_failures.lock().unwrap() = failures.into();
        self
    }

    pub fn with_poll_script(self, script: Vec<CatalogResult<ExportJobStatus>>) -> Self {
        *self.poll_script.lock().unwrap() = script.into();
        self
    }

    pub fn started_requests(&self) -> Vec<ExportJobRequest> {
        self.started.lock().unwrap().clone()
    }

    pub fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn list_data_sources(&self) -> CatalogResult<Vec<AssetRecord>> {
        match &self.list_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.data_sources.clone()),
        }
    }

    async fn list_data_sets(&self) -> CatalogResult<Vec<DataSetListing>> {
        Ok(self.data_sets.clone())
    }

    async fn list_analyses(&self) -> CatalogResult<Vec<AssetRecord>> {
        Ok(self.analyses.clone())
    }

    async fn list_dashboards(&self) -> CatalogResult<Vec<AssetRecord>> {
        Ok(self.dashboards.clone())
    }

    async fn describe_data_source(
        &self,
        data_source_id: &str,
    ) -> CatalogResult<DataSourceDescription> {
        self.source_describe_calls.fetch_add(1, Ordering::SeqCst);
        self.source_descriptions
            .get(data_source_id)
            .cloned()
            .unwrap_or_else(|| {
                Ok(DataSourceDescription {
                    arn: arn("datasource", data_source_id),
                    source_type: Some("ATHENA".to_string()),
                    ..Default::default()
                })
            })
    }

    async fn describe_data_set(&self, data_set_id: &str) -> CatalogResult<DataSetDescription> {
        self.data_set_descriptions
            .get(data_set_id)
            .cloned()
            .unwrap_or_else(|| {
                Ok(DataSetDescription {
                    arn: arn("dataset", data_set_id),
                    data_source_arns: Vec::new(),
                })
            })
    }

    async fn describe_analysis(&self, analysis_id: &str) -> CatalogResult<ReportDescription> {
        self.analysis_descriptions
            .get(analysis_id)
            .cloned()
            .unwrap_or_else(|| {
                Ok(ReportDescription {
                    arn: arn("analysis", analysis_id),
                    ..Default::default()
                })
            })
    }

    async fn describe_dashboard(&self, dashboard_id: &str) -> CatalogResult<ReportDescription> {
        self.dashboard_descriptions
            .get(dashboard_id)
            .cloned()
            .unwrap_or_else(|| {
                Ok(ReportDescription {
                    arn: arn("dashboard", dashboard_id),
                    ..Default::default()
                })
            })
    }

    async fn describe_theme(&self, theme_id: &str) -> CatalogResult<()> {
        if self.missing_themes.contains(theme_id) {
            Err(CatalogError::NotFound(format!("Theme {theme_id} not found")))
        } else {
            Ok(())
        }
    }

    async fn start_export_job(&self, request: &ExportJobRequest) -> CatalogResult<String> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.start_failures.lock().unwrap().pop_front() {
            return Err(e);
        }
        self.started.lock().unwrap().push(request.clone());
        Ok(request.job_id.clone())
    }

    async fn describe_export_job(&self, job_id: &str) -> CatalogResult<ExportJob> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.poll_script.lock().unwrap().pop_front();
        let status = match scripted {
            Some(observation) => observation?,
            None if self.failing_jobs.iter().any(|m| job_id.contains(m.as_str())) => {
                ExportJobStatus::Failed
            }
            None => ExportJobStatus::Successful,
        };

        let (download_url, errors) = match status {
            ExportJobStatus::Successful => {
                (Some(format!("https://artifacts.example.com/{job_id}.qs")), Vec::new())
            }
            ExportJobStatus::Failed => (
                None,
                vec!["InvalidResource: resource cannot be bundled".to_string()],
            ),
            _ => (None, Vec::new()),
        };

        Ok(ExportJob {
            job_id: job_id.to_string(),
            status,
            download_url,
            errors,
        })
    }

    async fn describe_account_settings(&self) -> CatalogResult<()> {
        match &self.account_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// A stored object
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub metadata: HashMap<String, String>,
}

/// Recording object store
#[derive(Default)]
pub struct FakeStore {
    /// Fail the upload of this part number
    pub fail_part: Option<i32>,
    pub bucket_error: Option<String>,

    pub puts: Mutex<Vec<StoredObject>>,
    pub multipart_created: Mutex<Vec<StoredObject>>,
    pub parts: Mutex<Vec<(i32, usize)>>,
    pub completed: Mutex<Vec<Vec<CompletedPart>>>,
    pub aborted: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_part(part_number: i32) -> Self {
        Self {
            fail_part: Some(part_number),
            ..Self::default()
        }
    }

    pub fn put_keys(&self) -> Vec<String> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn head_bucket(&self) -> Result<()> {
        match &self.bucket_error {
            Some(e) => Err(BackupError::Storage(e.clone())),
            None => Ok(()),
        }
    }

    async fn put_object(
        &self,
        key: &str,
        path: &Path,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let size = tokio::fs::metadata(path).await?.len();
        self.puts.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            size,
            metadata: metadata.clone(),
        });
        Ok(())
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<String> {
        self.multipart_created.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            size: 0,
            metadata: metadata.clone(),
        });
        Ok(format!("upload-{key}"))
    }

    async fn upload_part(
        &self,
        _key: &str,
        _upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> Result<String> {
        if self.fail_part == Some(part_number) {
            return Err(BackupError::Storage(format!(
                "upload_part failed for part {part_number}"
            )));
        }
        self.parts.lock().unwrap().push((part_number, body.len()));
        Ok(format!("etag-{part_number}"))
    }

    async fn complete_multipart_upload(
        &self,
        _key: &str,
        _upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<()> {
        self.completed.lock().unwrap().push(parts.to_vec());
        Ok(())
    }

    async fn abort_multipart_upload(&self, _key: &str, upload_id: &str) -> Result<()> {
        self.aborted.lock().unwrap().push(upload_id.to_string());
        Ok(())
    }
}

/// Fetcher producing `size` bytes of a repeating pattern
pub struct FakeFetcher {
    pub size: u64,
    pub fail: bool,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            fail: false,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            size: 0,
            fail: true,
            fetched: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ArtifactFetcher for FakeFetcher {
    async fn fetch_to(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(BackupError::Transfer(
                "Artifact download failed with status 403 Forbidden".to_string(),
            ));
        }

        let mut remaining = self.size;
        let block: Vec<u8> = (0..64u8).collect();
        while remaining > 0 {
            let n = remaining.min(block.len() as u64) as usize;
            sink.write_all(&block[..n]).await?;
            remaining -= n as u64;
        }
        Ok(self.size)
    }
}
