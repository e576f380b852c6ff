//! Discovery and validation across asset kinds

use super::validator::{DependencyValidator, StageOutcome};
use crate::adapters::catalog::CatalogClient;
use crate::domain::{AssetInventory, AssetKind, Result, SkipLedger};
use std::sync::Arc;

/// Validated inventory plus the skip ledger of one run
///
/// For each selected kind, the inventory and the ledger partition the
/// discovered assets.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub inventory: AssetInventory,
    pub ledger: SkipLedger,
}

/// Runs discovery and validation in dependency order
pub struct AssetSelector {
    catalog: Arc<dyn CatalogClient>,
    validator: DependencyValidator,
}

impl AssetSelector {
    /// Create a selector
    ///
    /// # Errors
    ///
    /// Returns an error if the validator cannot be created.
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Result<Self> {
        let validator = DependencyValidator::new(catalog.clone())?;
        Ok(Self { catalog, validator })
    }

    /// Discover and validate the given kinds
    ///
    /// Upstream stages always run up to the highest requested kind so that
    /// the skip sets feeding later stages are complete, but only requested
    /// kinds are kept in the result. Validation fully completes before this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns an error if listing any required kind fails.
    pub async fn select(&self, kinds: &[AssetKind]) -> Result<Selection> {
        let mut selection = Selection::default();
        let Some(highest) = kinds.iter().max().copied() else {
            return Ok(selection);
        };

        tracing::info!(kinds = ?kinds, "Discovering assets");

        let data_sources = self.catalog.list_data_sources().await?;
        let stage = self.validator.validate_data_sources(data_sources).await;
        let skipped_sources = stage.skipped_arns();
        keep(&mut selection, kinds, AssetKind::Datasource, stage);

        if highest < AssetKind::Dataset {
            return Ok(selection);
        }

        let data_sets = self.catalog.list_data_sets().await?;
        let stage = self
            .validator
            .validate_data_sets(data_sets, &skipped_sources)
            .await;
        let skipped_data_sets = stage.skipped_arns();
        keep(&mut selection, kinds, AssetKind::Dataset, stage);

        if kinds.contains(&AssetKind::Analysis) {
            let analyses = self.catalog.list_analyses().await?;
            let stage = self
                .validator
                .validate_analyses(analyses, &skipped_data_sets)
                .await;
            keep(&mut selection, kinds, AssetKind::Analysis, stage);
        }

        if kinds.contains(&AssetKind::Dashboard) {
            let dashboards = self.catalog.list_dashboards().await?;
            let stage = self
                .validator
                .validate_dashboards(dashboards, &skipped_data_sets)
                .await;
            keep(&mut selection, kinds, AssetKind::Dashboard, stage);
        }

        tracing::info!(
            validated = selection.inventory.total_count(),
            skipped = selection.ledger.len(),
            "Asset selection complete"
        );

        Ok(selection)
    }
}

fn keep(selection: &mut Selection, kinds: &[AssetKind], kind: AssetKind, stage: StageOutcome) {
    if !kinds.contains(&kind) {
        tracing::debug!(kind = %kind, "Kind validated for dependencies only");
        return;
    }
    selection.inventory.set(kind, stage.accepted);
    selection.ledger.extend(stage.skipped);
}

