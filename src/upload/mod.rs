//! Upload workflow for uptree.
//!
//! This module provides:
//! - Single-slot staging with size-limit checks
//! - The backend interface uploads are submitted to
//! - A local object store and backend built on it

mod backend;
mod stage;
mod storage;

pub use backend::{LocalBackend, ResourceBackend};
pub use stage::{StageSummary, StagedUpload, UploadKind, UploadStage};
pub use storage::ObjectStore;
