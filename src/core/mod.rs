//! Core backup logic
//!
//! # Modules
//!
//! - [`selection`] - Asset discovery and dependency validation
//! - [`export`] - Chunking, export jobs, coordination and summaries
//! - [`transport`] - Artifact spooling and upload
//! - [`retry`] - Shared retry policy with backoff and jitter
//! - [`manifest`] - Run manifest
//!
//! # Backup Workflow
//!
//! 1. **Discover**: List data sources, datasets, analyses and dashboards
//! 2. **Validate**: Skip assets with broken or unsupported dependencies
//! 3. **Chunk**: Split each kind into bundles of at most 100 assets
//! 4. **Export**: Start one export job per bundle and poll it to completion
//! 5. **Transport**: Stream the artifact into the destination bucket
//! 6. **Report**: Summarize and write the run manifest
//!
//! # Example
//!
//! ```rust,no_run
//! use quicksight_backup::config::load_config;
//! use quicksight_backup::core::export::BackupCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("quicksight-backup.toml")?;
//! let coordinator = BackupCoordinator::from_config(config).await?;
//!
//! let summary = coordinator.execute_backup().await?;
//!
//! println!("Processed: {}", summary.processed);
//! println!("Failed: {}", summary.failed);
//! println!("Skipped: {}", summary.skipped.len());
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod manifest;
pub mod retry;
pub mod selection;
pub mod transport;
