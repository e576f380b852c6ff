//! External system integrations
//!
//! - [`catalog`] - BI catalog service (asset listing, description, export jobs)
//! - [`storage`] - Object storage for exported bundles
//! - [`download`] - Artifact download from export job locations
//! - [`aws`] - Shared AWS SDK configuration and error mapping
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory fakes. The pipeline only sees the
//! [`catalog::CatalogClient`], [`storage::ObjectStore`] and
//! [`download::ArtifactFetcher`] traits.
//!
//! ```rust,no_run
//! use quicksight_backup::adapters::catalog::{CatalogClient, QuickSightCatalog};
//! use quicksight_backup::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("quicksight-backup.toml")?;
//! let catalog = QuickSightCatalog::new(&config.aws).await;
//! let datasources = catalog.list_data_sources().await?;
//! println!("{} data sources", datasources.len());
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod catalog;
pub mod download;
pub mod storage;
