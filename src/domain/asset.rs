//! Asset records and inventory
//!
//! An [`AssetRecord`] is created once during discovery and never mutated.
//! Identity is `(kind, id)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of BI asset, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Datasource,
    Dataset,
    Analysis,
    Dashboard,
}

impl AssetKind {
    /// All kinds in the order they must be validated and exported
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Datasource,
        AssetKind::Dataset,
        AssetKind::Analysis,
        AssetKind::Dashboard,
    ];

    /// Plural label used in job ids, object keys and reports
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Datasource => "datasources",
            AssetKind::Dataset => "datasets",
            AssetKind::Analysis => "analyses",
            AssetKind::Dashboard => "dashboards",
        }
    }

    /// Capitalized singular name used in skip reasons
    pub fn title(&self) -> &'static str {
        match self {
            AssetKind::Datasource => "Datasource",
            AssetKind::Dataset => "Dataset",
            AssetKind::Analysis => "Analysis",
            AssetKind::Dashboard => "Dashboard",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "datasource" | "datasources" => Ok(AssetKind::Datasource),
            "dataset" | "datasets" => Ok(AssetKind::Dataset),
            "analysis" | "analyses" => Ok(AssetKind::Analysis),
            "dashboard" | "dashboards" => Ok(AssetKind::Dashboard),
            other => Err(format!(
                "Unknown asset kind '{other}'. Must be one of: datasources, datasets, analyses, dashboards"
            )),
        }
    }
}

/// A discovered asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub kind: AssetKind,
    pub id: String,
    pub arn: String,
    pub name: String,
}

impl AssetRecord {
    pub fn new(
        kind: AssetKind,
        id: impl Into<String>,
        arn: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            id: id.into(),
            arn: arn.into(),
            name: name.into(),
        }
    }
}

/// Resource id from an ARN (the segment after the last `/`)
///
/// ```
/// use quicksight_backup::domain::asset::arn_resource_id;
///
/// let arn = "arn:aws:quicksight:us-east-1:123456789012:datasource/sales-db";
/// assert_eq!(arn_resource_id(arn), "sales-db");
/// ```
pub fn arn_resource_id(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

/// Validated assets grouped by kind
///
/// Order within a kind is discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetInventory {
    pub datasources: Vec<AssetRecord>,
    pub datasets: Vec<AssetRecord>,
    pub analyses: Vec<AssetRecord>,
    pub dashboards: Vec<AssetRecord>,
}

impl AssetInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets of one kind
    pub fn get(&self, kind: AssetKind) -> &[AssetRecord] {
        match kind {
            AssetKind::Datasource => &self.datasources,
            AssetKind::Dataset => &self.datasets,
            AssetKind::Analysis => &self.analyses,
            AssetKind::Dashboard => &self.dashboards,
        }
    }

    /// Replace the assets of one kind
    pub fn set(&mut self, kind: AssetKind, assets: Vec<AssetRecord>) {
        match kind {
            AssetKind::Datasource => self.datasources = assets,
            AssetKind::Dataset => self.datasets = assets,
            AssetKind::Analysis => self.analyses = assets,
            AssetKind::Dashboard => self.dashboards = assets,
        }
    }

    pub fn total_count(&self) -> usize {
        AssetKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Whether an asset with this ARN is present under the given kind
    pub fn contains_arn(&self, kind: AssetKind, arn: &str) -> bool {
        self.get(kind).iter().any(|a| a.arn == arn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_labels() {
        assert_eq!(AssetKind::Datasource.label(), "datasources");
        assert_eq!(AssetKind::Analysis.label(), "analyses");
        assert_eq!(AssetKind::Dashboard.title(), "Dashboard");
        assert_eq!(AssetKind::Dataset.to_string(), "datasets");
    }

    #[test]
    fn test_asset_kind_from_str() {
        assert_eq!("datasets".parse::<AssetKind>().unwrap(), AssetKind::Dataset);
        assert_eq!(
            " Analysis ".parse::<AssetKind>().unwrap(),
            AssetKind::Analysis
        );
        assert!("themes".parse::<AssetKind>().is_err());
    }

    #[test]
    fn test_asset_kind_dependency_order() {
        let mut kinds = vec![
            AssetKind::Dashboard,
            AssetKind::Datasource,
            AssetKind::Analysis,
            AssetKind::Dataset,
        ];
        kinds.sort();
        assert_eq!(kinds, AssetKind::ALL.to_vec());
    }

    #[test]
    fn test_inventory_set_and_count() {
        let mut inventory = AssetInventory::new();
        assert!(inventory.is_empty());

        inventory.set(
            AssetKind::Dataset,
            vec![
                AssetRecord::new(AssetKind::Dataset, "a", "arn:a", "A"),
                AssetRecord::new(AssetKind::Dataset, "b", "arn:b", "B"),
            ],
        );

        assert_eq!(inventory.total_count(), 2);
        assert_eq!(inventory.get(AssetKind::Dataset).len(), 2);
        assert!(inventory.contains_arn(AssetKind::Dataset, "arn:b"));
        assert!(!inventory.contains_arn(AssetKind::Analysis, "arn:b"));
    }
}
