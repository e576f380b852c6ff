//! Domain models and types for the backup tool.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Assets** ([`AssetKind`], [`AssetRecord`], [`AssetInventory`])
//! - **Skip ledger** ([`SkipRecord`], [`SkipLedger`], [`SkippedArns`])
//! - **Error types** ([`BackupError`], [`CatalogError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BackupError>`]:
//!
//! ```rust,no_run
//! use quicksight_backup::domain::{BackupError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = quicksight_backup::config::load_config("quicksight-backup.toml")?;
//!     Ok(())
//! }
//! ```

pub mod asset;
pub mod errors;
pub mod result;
pub mod skip;

// Re-export commonly used types for convenience
pub use asset::{AssetInventory, AssetKind, AssetRecord};
pub use errors::{BackupError, CatalogError};
pub use result::Result;
pub use skip::{SkipLedger, SkipRecord, SkippedArns};
