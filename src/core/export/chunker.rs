//! Bundle chunking
//!
//! Splits the validated assets of one kind into size-bounded groups, each
//! submitted as one export job.

use crate::domain::{AssetKind, AssetRecord, BackupError, Result};

/// Upper bound on resources per export job
pub const MAX_ASSETS_PER_BUNDLE: usize = 100;

/// A size-bounded group of assets of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: AssetKind,

    /// 1-based position within the kind
    pub number: usize,

    /// Number of chunks for the kind in this run
    pub total: usize,

    pub assets: Vec<AssetRecord>,
}

impl Chunk {
    pub fn resource_arns(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.arn.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Partition `assets` into `ceil(N / max_per_bundle)` chunks
///
/// Order is preserved and every chunk except possibly the last holds
/// exactly `max_per_bundle` assets.
///
/// # Errors
///
/// Returns a configuration error if `max_per_bundle` is outside `1..=100`.
///
/// # Example
///
/// ```
/// use quicksight_backup::core::export::chunk;
/// use quicksight_backup::domain::{AssetKind, AssetRecord};
///
/// let assets: Vec<AssetRecord> = (0..120)
///     .map(|i| AssetRecord::new(AssetKind::Dataset, format!("ds-{i}"), format!("arn:ds-{i}"), ""))
///     .collect();
///
/// let chunks = chunk(AssetKind::Dataset, assets, 50).unwrap();
/// let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
/// assert_eq!(sizes, vec![50, 50, 20]);
/// ```
pub fn chunk(
    kind: AssetKind,
    assets: Vec<AssetRecord>,
    max_per_bundle: usize,
) -> Result<Vec<Chunk>> {
    if max_per_bundle == 0 || max_per_bundle > MAX_ASSETS_PER_BUNDLE {
        return Err(BackupError::Configuration(format!(
            "max_per_bundle must be between 1 and {MAX_ASSETS_PER_BUNDLE}, got {max_per_bundle}"
        )));
    }

    let total = assets.len().div_ceil(max_per_bundle);
    let mut chunks = Vec::with_capacity(total);
    let mut iter = assets.into_iter().peekable();
    let mut number = 0;

    while iter.peek().is_some() {
        number += 1;
        chunks.push(Chunk {
            kind,
            number,
            total,
            assets: iter.by_ref().take(max_per_bundle).collect(),
        });
    }

    tracing::debug!(
        kind = %kind,
        chunks = total,
        max_per_bundle,
        "Split assets into chunks"
    );

    Ok(chunks)
}
