//! Dependency validation
//!
//! Each stage decides, per asset, whether it is safe to export. Stages run
//! in dependency order and a stage only reads the skip set produced by the
//! stage before it:
//!
//! 1. data sources
//! 2. datasets, given the skipped data source ARNs
//! 3. analyses and dashboards, given the skipped dataset ARNs
//!
//! Only explicit not-found and invalid-parameter signals exclude an asset.
//! Access-denied and unexpected errors include it.

use crate::adapters::catalog::{
    CatalogClient, DataSetDescription, DataSetListing, DataSourceDescription, ReportDescription,
};
use crate::domain::asset::arn_resource_id;
use crate::domain::{AssetKind, AssetRecord, BackupError, CatalogError, Result, SkipRecord, SkippedArns};
use crate::log_skip;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

const MANIFEST_UPLOAD_REASON: &str = "S3 datasource created via local manifest file upload";
const INVALID_VPC_REASON: &str = "Datasource contains invalid VPC connection ID";
const FILE_DATASET_REASON: &str = "FILE dataset type not supported by AssetBundle API";

/// Storage modes the export job can bundle
const SUPPORTED_IMPORT_MODES: [&str; 2] = ["SPICE", "DIRECT_QUERY"];

/// Accepted and skipped assets of one validation stage
///
/// Every input asset lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutcome {
    pub accepted: Vec<AssetRecord>,
    pub skipped: Vec<SkipRecord>,
}

impl StageOutcome {
    fn accept(&mut self, asset: AssetRecord) {
        self.accepted.push(asset);
    }

    fn skip(&mut self, asset: &AssetRecord, reason: impl Into<String>) {
        let record = SkipRecord::for_asset(asset, reason);
        log_skip!(&record);
        self.skipped.push(record);
    }

    /// Skipped ARNs of this stage, for the next one
    pub fn skipped_arns(&self) -> SkippedArns {
        SkippedArns::from_records(&self.skipped)
    }
}

/// Memoized existence checks, scoped to one stage
#[derive(Default)]
struct StageCache {
    data_sources: HashMap<String, bool>,
    themes: HashMap<String, bool>,
    data_sets: HashMap<String, Option<DataSetDescription>>,
}

/// Validates assets against their dependencies
pub struct DependencyValidator {
    catalog: Arc<dyn CatalogClient>,
    vpc_id_pattern: Regex,
}

impl DependencyValidator {
    /// Create a validator over a catalog client
    ///
    /// # Errors
    ///
    /// Returns an error if the connection id pattern fails to compile.
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Result<Self> {
        let vpc_id_pattern = Regex::new(r"^[\w\-]+$")
            .map_err(|e| BackupError::Other(format!("Invalid VPC id pattern: {e}")))?;
        Ok(Self {
            catalog,
            vpc_id_pattern,
        })
    }

    /// Stage 1: data sources
    pub async fn validate_data_sources(&self, assets: Vec<AssetRecord>) -> StageOutcome {
        let mut outcome = StageOutcome::default();

        for asset in assets {
            match self.catalog.describe_data_source(&asset.id).await {
                Ok(description) => match self.data_source_issue(&description) {
                    Some(reason) => outcome.skip(&asset, reason),
                    None => outcome.accept(asset),
                },
                Err(e) => {
                    tracing::warn!(
                        data_source_id = %asset.id,
                        error = %e,
                        "Could not describe data source, including it"
                    );
                    outcome.accept(asset);
                }
            }
        }

        tracing::info!(
            accepted = outcome.accepted.len(),
            skipped = outcome.skipped.len(),
            "Validated data sources"
        );
        outcome
    }

    /// Stage 2: datasets
    pub async fn validate_data_sets(
        &self,
        listings: Vec<DataSetListing>,
        skipped_sources: &SkippedArns,
    ) -> StageOutcome {
        let mut outcome = StageOutcome::default();
        let mut cache = StageCache::default();

        for DataSetListing { asset, import_mode } in listings {
            let supported = import_mode
                .as_deref()
                .is_some_and(|mode| SUPPORTED_IMPORT_MODES.contains(&mode));
            if !supported {
                outcome.skip(&asset, FILE_DATASET_REASON);
                continue;
            }

            match self.catalog.describe_data_set(&asset.id).await {
                Ok(description) => {
                    match self
                        .data_set_issue(&description, skipped_sources, &mut cache)
                        .await
                    {
                        Some(reason) => outcome.skip(&asset, reason),
                        None => outcome.accept(asset),
                    }
                }
                Err(CatalogError::InvalidParameter(message)) => {
                    outcome.skip(&asset, format!("Dataset validation failed: {message}"));
                }
                Err(CatalogError::NotFound(message)) => {
                    outcome.skip(&asset, format!("Dataset no longer exists: {message}"));
                }
                Err(e) => {
                    tracing::warn!(
                        data_set_id = %asset.id,
                        error = %e,
                        "Could not describe dataset, including it"
                    );
                    outcome.accept(asset);
                }
            }
        }

        tracing::info!(
            accepted = outcome.accepted.len(),
            skipped = outcome.skipped.len(),
            "Validated datasets"
        );
        outcome
    }

    /// Stage 3: analyses
    pub async fn validate_analyses(
        &self,
        assets: Vec<AssetRecord>,
        skipped_data_sets: &SkippedArns,
    ) -> StageOutcome {
        self.validate_reports(AssetKind::Analysis, assets, skipped_data_sets)
            .await
    }

    /// Stage 3: dashboards
    pub async fn validate_dashboards(
        &self,
        assets: Vec<AssetRecord>,
        skipped_data_sets: &SkippedArns,
    ) -> StageOutcome {
        self.validate_reports(AssetKind::Dashboard, assets, skipped_data_sets)
            .await
    }

    async fn validate_reports(
        &self,
        kind: AssetKind,
        assets: Vec<AssetRecord>,
        skipped_data_sets: &SkippedArns,
    ) -> StageOutcome {
        let mut outcome = StageOutcome::default();
        let mut cache = StageCache::default();

        for asset in assets {
            let described = if kind == AssetKind::Analysis {
                self.catalog.describe_analysis(&asset.id).await
            } else {
                self.catalog.describe_dashboard(&asset.id).await
            };

            match described {
                Ok(description) => {
                    match self
                        .report_issue(kind, &description, skipped_data_sets, &mut cache)
                        .await
                    {
                        Some(reason) => outcome.skip(&asset, reason),
                        None => outcome.accept(asset),
                    }
                }
                Err(CatalogError::NotFound(message)) => {
                    outcome.skip(&asset, format!("{} no longer exists: {message}", kind.title()));
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        resource_id = %asset.id,
                        error = %e,
                        "Could not describe resource, including it"
                    );
                    outcome.accept(asset);
                }
            }
        }

        tracing::info!(
            kind = %kind,
            accepted = outcome.accepted.len(),
            skipped = outcome.skipped.len(),
            "Validated reports"
        );
        outcome
    }

    fn data_source_issue(&self, description: &DataSourceDescription) -> Option<String> {
        if description.source_type.as_deref() == Some("S3") && !description.has_s3_parameters {
            return Some(MANIFEST_UPLOAD_REASON.to_string());
        }

        if let Some(vpc_arn) = description.vpc_connection_arn.as_deref() {
            if !self.vpc_id_pattern.is_match(arn_resource_id(vpc_arn)) {
                return Some(INVALID_VPC_REASON.to_string());
            }
        }

        None
    }

    async fn data_set_issue(
        &self,
        description: &DataSetDescription,
        skipped_sources: &SkippedArns,
        cache: &mut StageCache,
    ) -> Option<String> {
        for source_arn in &description.data_source_arns {
            if skipped_sources.contains(source_arn) {
                return Some(format!("Dataset depends on skipped datasource: {source_arn}"));
            }
            if !self.data_source_exists(source_arn, cache).await {
                return Some(format!(
                    "Dataset references non-existent datasource: {source_arn}"
                ));
            }
        }
        None
    }

    async fn report_issue(
        &self,
        kind: AssetKind,
        description: &ReportDescription,
        skipped_data_sets: &SkippedArns,
        cache: &mut StageCache,
    ) -> Option<String> {
        let title = kind.title();
        let data_set_arns = description.all_data_set_arns();

        if let Some(arn) = data_set_arns.iter().find(|a| skipped_data_sets.contains(a)) {
            return Some(format!("{title} depends on skipped dataset: {arn}"));
        }

        if let Some(theme_arn) = description.theme_arn.as_deref().filter(|a| !a.is_empty()) {
            if !self.theme_exists(theme_arn, cache).await {
                return Some(format!("{title} references non-existent theme: {theme_arn}"));
            }
        }

        for data_set_arn in &data_set_arns {
            let Some(data_set) = self.data_set_description(data_set_arn, cache).await else {
                continue;
            };
            for source_arn in &data_set.data_source_arns {
                if !self.data_source_exists(source_arn, cache).await {
                    return Some(format!(
                        "{title} depends on dataset {data_set_arn} which references non-existent datasource: {source_arn}"
                    ));
                }
            }
        }

        None
    }

    async fn data_source_exists(&self, arn: &str, cache: &mut StageCache) -> bool {
        if let Some(exists) = cache.data_sources.get(arn) {
            return *exists;
        }

        let exists = match self
            .catalog
            .describe_data_source(arn_resource_id(arn))
            .await
        {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                tracing::debug!(arn, error = %e, "Data source existence unknown, assuming present");
                true
            }
        };

        cache.data_sources.insert(arn.to_string(), exists);
        exists
    }

    async fn theme_exists(&self, arn: &str, cache: &mut StageCache) -> bool {
        if let Some(exists) = cache.themes.get(arn) {
            return *exists;
        }

        let exists = match self.catalog.describe_theme(arn_resource_id(arn)).await {
            Ok(()) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                tracing::warn!(theme_arn = arn, error = %e, "Could not check theme, assuming present");
                true
            }
        };

        cache.themes.insert(arn.to_string(), exists);
        exists
    }

    /// Description of a referenced dataset, `None` if it cannot be described
    async fn data_set_description(
        &self,
        arn: &str,
        cache: &mut StageCache,
    ) -> Option<DataSetDescription> {
        if let Some(cached) = cache.data_sets.get(arn) {
            return cached.clone();
        }

        let description = match self.catalog.describe_data_set(arn_resource_id(arn)).await {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::debug!(arn, error = %e, "Referenced dataset not describable, skipping transitive check");
                None
            }
        };

        cache.data_sets.insert(arn.to_string(), description.clone());
        description
    }
}
