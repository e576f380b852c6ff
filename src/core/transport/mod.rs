//! Artifact transport into object storage
//!
//! - [`transporter`] - spool, hash and upload one bundle
//! - [`key`] - destination key layout

pub mod key;
pub mod transporter;

pub use key::{DateFormat, KeyBuilder};
pub use transporter::{
    plan_parts, provenance_metadata, BundleTransporter, PartRange, TransferConfig, TransferResult,
};
