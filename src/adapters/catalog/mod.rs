//! BI catalog service integration
//!
//! - [`traits`] - the [`CatalogClient`] capability interface and its data types
//! - [`quicksight`] - QuickSight implementation backed by the AWS SDK

pub mod quicksight;
pub mod traits;

pub use quicksight::QuickSightCatalog;
pub use traits::{
    CatalogClient, CatalogResult, DataSetDescription, DataSetListing, DataSourceDescription,
    ExportJob, ExportJobRequest, ExportJobStatus, ReportDescription,
};
