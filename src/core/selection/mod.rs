//! Asset discovery and dependency validation
//!
//! - [`validator`] - per-stage inclusion rules with skip reasons
//! - [`selector`] - runs the stages in dependency order

pub mod selector;
pub mod validator;

pub use selector::{AssetSelector, Selection};
pub use validator::{DependencyValidator, StageOutcome};
