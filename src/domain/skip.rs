//! Skip records and the skip ledger
//!
//! A [`SkipRecord`] marks one asset as excluded from backup. Records are
//! never mutated after creation. Each validation stage reads the skipped
//! ARNs of earlier stages through an immutable [`SkippedArns`] snapshot.

use super::asset::{AssetKind, AssetRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Audit entry for an excluded asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub resource_id: String,
    pub resource_kind: AssetKind,
    pub resource_name: String,
    pub resource_arn: String,
    pub reason: String,
}

impl SkipRecord {
    /// Create a skip record for an asset
    pub fn for_asset(asset: &AssetRecord, reason: impl Into<String>) -> Self {
        Self {
            resource_id: asset.id.clone(),
            resource_kind: asset.kind,
            resource_name: asset.name.clone(),
            resource_arn: asset.arn.clone(),
            reason: reason.into(),
        }
    }
}

/// Append-only ledger of skip records for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkipLedger {
    records: Vec<SkipRecord>,
}

impl SkipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records produced by one validation stage
    pub fn extend(&mut self, records: impl IntoIterator<Item = SkipRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[SkipRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for one asset kind
    pub fn of_kind(&self, kind: AssetKind) -> impl Iterator<Item = &SkipRecord> {
        self.records.iter().filter(move |r| r.resource_kind == kind)
    }

    /// Immutable snapshot of skipped ARNs for one kind
    pub fn skipped_arns(&self, kind: AssetKind) -> SkippedArns {
        SkippedArns::from_records(self.of_kind(kind))
    }

    pub fn into_records(self) -> Vec<SkipRecord> {
        self.records
    }
}

/// Set of ARNs skipped by an earlier validation stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkippedArns(HashSet<String>);

impl SkippedArns {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SkipRecord>) -> Self {
        Self(
            records
                .into_iter()
                .map(|r| r.resource_arn.clone())
                .filter(|arn| !arn.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, arn: &str) -> bool {
        self.0.contains(arn)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
