//! QuickSight implementation of [`CatalogClient`]

use super::traits::{
    CatalogClient, CatalogResult, DataSetDescription, DataSetListing, DataSourceDescription,
    ExportJob, ExportJobRequest, ExportJobStatus, ReportDescription,
};
use crate::adapters::aws::{load_sdk_config, sdk_error_parts};
use crate::config::AwsConfig;
use crate::domain::{AssetKind, AssetRecord, CatalogError};
use async_trait::async_trait;
use aws_sdk_quicksight as quicksight;
use aws_sdk_quicksight::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_quicksight::types::{
    AssetBundleExportFormat, DataSetIdentifierDeclaration, DataSourceParameters, PhysicalTable,
};
use std::collections::BTreeMap;

/// Map an SDK error into the catalog taxonomy
fn catalog_error<E, R>(operation: &str, err: SdkError<E, R>) -> CatalogError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let (code, message) = sdk_error_parts(&err);
    tracing::debug!(operation, code = %code, message = %message, "QuickSight call failed");
    CatalogError::from_code(&code, message)
}

/// Catalog client backed by the QuickSight API
pub struct QuickSightCatalog {
    client: quicksight::Client,
    account_id: String,
}

impl QuickSightCatalog {
    /// Create a client for the configured account and region
    pub async fn new(config: &AwsConfig) -> Self {
        let sdk_config = load_sdk_config(config, &config.region).await;
        Self {
            client: quicksight::Client::new(&sdk_config),
            account_id: config.account_id.clone(),
        }
    }

    /// Wrap an existing SDK client
    pub fn from_client(client: quicksight::Client, account_id: impl Into<String>) -> Self {
        Self {
            client,
            account_id: account_id.into(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn describe_analysis_definition(&self, analysis_id: &str) -> Vec<String> {
        match self
            .client
            .describe_analysis_definition()
            .aws_account_id(&self.account_id)
            .analysis_id(analysis_id)
            .send()
            .await
        {
            Ok(output) => output
                .definition()
                .map(|d| declared_arns(d.data_set_identifier_declarations()))
                .unwrap_or_default(),
            Err(e) => {
                let err = catalog_error("DescribeAnalysisDefinition", e);
                tracing::debug!(analysis_id, error = %err, "Analysis definition unavailable");
                Vec::new()
            }
        }
    }

    async fn describe_dashboard_definition(&self, dashboard_id: &str) -> Vec<String> {
        match self
            .client
            .describe_dashboard_definition()
            .aws_account_id(&self.account_id)
            .dashboard_id(dashboard_id)
            .send()
            .await
        {
            Ok(output) => output
                .definition()
                .map(|d| declared_arns(d.data_set_identifier_declarations()))
                .unwrap_or_default(),
            Err(e) => {
                let err = catalog_error("DescribeDashboardDefinition", e);
                tracing::debug!(dashboard_id, error = %err, "Dashboard definition unavailable");
                Vec::new()
            }
        }
    }
}

fn declared_arns(declarations: &[DataSetIdentifierDeclaration]) -> Vec<String> {
    declarations
        .iter()
        .map(|d| d.data_set_arn().to_string())
        .filter(|arn| !arn.is_empty())
        .collect()
}

fn record(kind: AssetKind, id: Option<&str>, arn: Option<&str>, name: Option<&str>) -> AssetRecord {
    AssetRecord::new(
        kind,
        id.unwrap_or_default(),
        arn.unwrap_or_default(),
        name.unwrap_or_default(),
    )
}

#[async_trait]
impl CatalogClient for QuickSightCatalog {
    async fn list_data_sources(&self) -> CatalogResult<Vec<AssetRecord>> {
        let mut out = Vec::new();
        let mut pages = self
            .client
            .list_data_sources()
            .aws_account_id(&self.account_id)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| catalog_error("ListDataSources", e))?;
            for ds in page.data_sources() {
                out.push(record(
                    AssetKind::Datasource,
                    ds.data_source_id(),
                    ds.arn(),
                    ds.name(),
                ));
            }
        }

        Ok(out)
    }

    async fn list_data_sets(&self) -> CatalogResult<Vec<DataSetListing>> {
        let mut out = Vec::new();
        let mut pages = self
            .client
            .list_data_sets()
            .aws_account_id(&self.account_id)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| catalog_error("ListDataSets", e))?;
            for ds in page.data_set_summaries() {
                out.push(DataSetListing {
                    asset: record(AssetKind::Dataset, ds.data_set_id(), ds.arn(), ds.name()),
                    import_mode: ds.import_mode().map(|m| m.as_str().to_string()),
                });
            }
        }

        Ok(out)
    }

    async fn list_analyses(&self) -> CatalogResult<Vec<AssetRecord>> {
        let mut out = Vec::new();
        let mut pages = self
            .client
            .list_analyses()
            .aws_account_id(&self.account_id)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| catalog_error("ListAnalyses", e))?;
            for a in page.analysis_summary_list() {
                out.push(record(
                    AssetKind::Analysis,
                    a.analysis_id(),
                    a.arn(),
                    a.name(),
                ));
            }
        }

        Ok(out)
    }

    async fn list_dashboards(&self) -> CatalogResult<Vec<AssetRecord>> {
        let mut out = Vec::new();
        let mut pages = self
            .client
            .list_dashboards()
            .aws_account_id(&self.account_id)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| catalog_error("ListDashboards", e))?;
            for d in page.dashboard_summary_list() {
                out.push(record(
                    AssetKind::Dashboard,
                    d.dashboard_id(),
                    d.arn(),
                    d.name(),
                ));
            }
        }

        Ok(out)
    }

    async fn describe_data_source(
        &self,
        data_source_id: &str,
    ) -> CatalogResult<DataSourceDescription> {
        let output = self
            .client
            .describe_data_source()
            .aws_account_id(&self.account_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| catalog_error("DescribeDataSource", e))?;

        let Some(ds) = output.data_source() else {
            return Ok(DataSourceDescription::default());
        };

        Ok(DataSourceDescription {
            arn: ds.arn().unwrap_or_default().to_string(),
            source_type: ds.r#type().map(|t| t.as_str().to_string()),
            has_s3_parameters: matches!(
                ds.data_source_parameters(),
                Some(DataSourceParameters::S3Parameters(_))
            ),
            vpc_connection_arn: ds
                .vpc_connection_properties()
                .map(|p| p.vpc_connection_arn().to_string()),
        })
    }

    async fn describe_data_set(&self, data_set_id: &str) -> CatalogResult<DataSetDescription> {
        let output = self
            .client
            .describe_data_set()
            .aws_account_id(&self.account_id)
            .data_set_id(data_set_id)
            .send()
            .await
            .map_err(|e| catalog_error("DescribeDataSet", e))?;

        let Some(ds) = output.data_set() else {
            return Ok(DataSetDescription::default());
        };

        // Stable order across runs
        let tables: BTreeMap<&String, &PhysicalTable> = ds
            .physical_table_map()
            .map(|m| m.iter().collect())
            .unwrap_or_default();

        let data_source_arns = tables
            .values()
            .filter_map(|table| match table {
                PhysicalTable::RelationalTable(t) => Some(t.data_source_arn().to_string()),
                PhysicalTable::CustomSql(t) => Some(t.data_source_arn().to_string()),
                PhysicalTable::S3Source(t) => Some(t.data_source_arn().to_string()),
                _ => None,
            })
            .filter(|arn| !arn.is_empty())
            .collect();

        Ok(DataSetDescription {
            arn: ds.arn().unwrap_or_default().to_string(),
            data_source_arns,
        })
    }

    async fn describe_analysis(&self, analysis_id: &str) -> CatalogResult<ReportDescription> {
        let output = self
            .client
            .describe_analysis()
            .aws_account_id(&self.account_id)
            .analysis_id(analysis_id)
            .send()
            .await
            .map_err(|e| catalog_error("DescribeAnalysis", e))?;

        let mut description = output
            .analysis()
            .map(|a| ReportDescription {
                arn: a.arn().unwrap_or_default().to_string(),
                data_set_arns: a.data_set_arns().to_vec(),
                declared_data_set_arns: Vec::new(),
                theme_arn: a.theme_arn().map(str::to_string),
            })
            .unwrap_or_default();

        description.declared_data_set_arns = self.describe_analysis_definition(analysis_id).await;
        Ok(description)
    }

    async fn describe_dashboard(&self, dashboard_id: &str) -> CatalogResult<ReportDescription> {
        let output = self
            .client
            .describe_dashboard()
            .aws_account_id(&self.account_id)
            .dashboard_id(dashboard_id)
            .send()
            .await
            .map_err(|e| catalog_error("DescribeDashboard", e))?;

        let mut description = output
            .dashboard()
            .map(|d| {
                let version = d.version();
                ReportDescription {
                    arn: d.arn().unwrap_or_default().to_string(),
                    data_set_arns: version
                        .map(|v| v.data_set_arns().to_vec())
                        .unwrap_or_default(),
                    declared_data_set_arns: Vec::new(),
                    theme_arn: version.and_then(|v| v.theme_arn()).map(str::to_string),
                }
            })
            .unwrap_or_default();

        description.declared_data_set_arns =
            self.describe_dashboard_definition(dashboard_id).await;
        Ok(description)
    }

    async fn describe_theme(&self, theme_id: &str) -> CatalogResult<()> {
        self.client
            .describe_theme()
            .aws_account_id(&self.account_id)
            .theme_id(theme_id)
            .send()
            .await
            .map_err(|e| catalog_error("DescribeTheme", e))?;
        Ok(())
    }

    async fn start_export_job(&self, request: &ExportJobRequest) -> CatalogResult<String> {
        let output = self
            .client
            .start_asset_bundle_export_job()
            .aws_account_id(&self.account_id)
            .asset_bundle_export_job_id(&request.job_id)
            .set_resource_arns(Some(request.resource_arns.clone()))
            .export_format(AssetBundleExportFormat::from(request.export_format.as_str()))
            .include_all_dependencies(request.include_all_dependencies)
            .include_permissions(request.include_permissions)
            .include_tags(request.include_tags)
            .send()
            .await
            .map_err(|e| catalog_error("StartAssetBundleExportJob", e))?;

        Ok(output
            .asset_bundle_export_job_id()
            .unwrap_or(&request.job_id)
            .to_string())
    }

    async fn describe_export_job(&self, job_id: &str) -> CatalogResult<ExportJob> {
        let output = self
            .client
            .describe_asset_bundle_export_job()
            .aws_account_id(&self.account_id)
            .asset_bundle_export_job_id(job_id)
            .send()
            .await
            .map_err(|e| catalog_error("DescribeAssetBundleExportJob", e))?;

        let status = output
            .job_status()
            .map(|s| ExportJobStatus::parse(s.as_str()))
            .unwrap_or_else(|| ExportJobStatus::Unknown("UNKNOWN".to_string()));

        let errors = output
            .errors()
            .iter()
            .map(|e| {
                format!(
                    "{}: {}",
                    e.r#type().unwrap_or("Error"),
                    e.message().unwrap_or_default()
                )
            })
            .collect();

        Ok(ExportJob {
            job_id: job_id.to_string(),
            status,
            download_url: output.download_url().map(str::to_string),
            errors,
        })
    }

    async fn describe_account_settings(&self) -> CatalogResult<()> {
        self.client
            .describe_account_settings()
            .aws_account_id(&self.account_id)
            .send()
            .await
            .map_err(|e| catalog_error("DescribeAccountSettings", e))?;
        Ok(())
    }
}
