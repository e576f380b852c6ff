// QuickSight Backup - Dependency-aware QuickSight asset backup
// Copyright (c) 2025 QuickSight Backup Contributors
// Licensed under the MIT License

//! # QuickSight Backup
//!
//! Backs up the analytical assets of a QuickSight account (datasources,
//! datasets, analyses and dashboards) as asset bundles archived to S3.
//!
//! ## Overview
//!
//! A run:
//! - **Discovers** assets of every enabled kind
//! - **Validates** them in dependency order, recording a skip reason for
//!   every asset the bundle export API would reject
//! - **Chunks** the surviving assets into bundles of at most 100
//! - **Exports** each chunk through an asynchronous export job with
//!   retry and adaptive polling
//! - **Transfers** each finished artifact to the destination bucket,
//!   using multipart upload for large artifacts
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (selection, export, transport, manifest)
//! - [`adapters`] - External integrations (QuickSight, S3, HTTP download)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quicksight_backup::config::load_config;
//! use quicksight_backup::core::export::BackupCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("quicksight-backup.toml")?;
//!     let coordinator = BackupCoordinator::from_config(config).await?;
//!
//!     let summary = coordinator.execute_backup().await?;
//!     println!(
//!         "Processed {}, failed {}, skipped {}",
//!         summary.processed,
//!         summary.failed,
//!         summary.skipped.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All library operations return [`domain::Result`], backed by
//! [`domain::BackupError`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
