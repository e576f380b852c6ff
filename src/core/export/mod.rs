//! Export orchestration
//!
//! This module provides the export pipeline, including:
//! - Chunking validated assets into bundles
//! - Running and polling export jobs
//! - Coordinating export and transport per chunk
//! - Summary and reporting

pub mod chunker;
pub mod coordinator;
pub mod poller;
pub mod runner;
pub mod summary;

pub use chunker::{chunk, Chunk, MAX_ASSETS_PER_BUNDLE};
pub use coordinator::{BackupCoordinator, PrerequisiteReport};
pub use poller::{JobPoller, PollSchedule, PollWindow};
pub use runner::{job_id_for, CompletedExport, ExportJobRunner, ExportOptions};
pub use summary::{
    BackupStatus, BackupSummary, ChunkOutcome, ExportError, ExportErrorType, KindSummary,
};
