//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod backup;
pub mod check;
pub mod validate;
