//! Single-slot staging of a pending upload.

use serde::Serialize;
use tracing::{debug, warn};

use crate::tree::{build_file_tree, build_folder_tree, FileEntry, FolderUpload, RawEntry};
use crate::{Result, UptreeError};

/// Kind of a staged upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    File,
    Folder,
}

/// An upload built and awaiting confirmation.
#[derive(Debug, Clone)]
pub enum StagedUpload {
    /// Loose files.
    Files(Vec<FileEntry>),
    /// One folder tree with its transport lists.
    Folder(FolderUpload),
}

impl StagedUpload {
    pub fn kind(&self) -> UploadKind {
        match self {
            StagedUpload::Files(_) => UploadKind::File,
            StagedUpload::Folder(_) => UploadKind::Folder,
        }
    }

    /// Aggregate size in bytes.
    pub fn total_size(&self) -> u64 {
        match self {
            StagedUpload::Files(files) => files.iter().map(|f| f.file_size).sum(),
            StagedUpload::Folder(upload) => upload.root.total_size,
        }
    }

    /// Names shown to the user: every file, or the folder name.
    pub fn names(&self) -> Vec<String> {
        match self {
            StagedUpload::Files(files) => files.iter().map(|f| f.name.clone()).collect(),
            StagedUpload::Folder(upload) => vec![upload.root.name.clone()],
        }
    }

    /// Number of top-level items: files, or one folder.
    pub fn item_count(&self) -> usize {
        match self {
            StagedUpload::Files(files) => files.len(),
            StagedUpload::Folder(_) => 1,
        }
    }

    /// Number of files that will be transferred.
    pub fn file_count(&self) -> usize {
        match self {
            StagedUpload::Files(files) => files.len(),
            StagedUpload::Folder(upload) => upload.payloads.len(),
        }
    }

    /// Fails with `SizeLimitExceeded` when over `limit` bytes.
    pub fn check_limit(&self, limit: u64) -> Result<()> {
        let total = self.total_size();
        if total > limit {
            return Err(UptreeError::SizeLimitExceeded { total, limit });
        }
        Ok(())
    }

    pub fn summary(&self, limit: u64) -> StageSummary {
        let item_count = self.item_count();
        let message = match self {
            StagedUpload::Files(_) => format!("You are about to upload {item_count} file(s)"),
            StagedUpload::Folder(_) => "You are about to upload 1 folder".to_string(),
        };
        StageSummary {
            kind: self.kind(),
            item_count,
            file_count: self.file_count(),
            names: self.names(),
            total_size: self.total_size(),
            message,
            over_limit: self.total_size() > limit,
        }
    }
}

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub kind: UploadKind,
    pub item_count: usize,
    pub file_count: usize,
    pub names: Vec<String>,
    pub total_size: u64,
    pub message: String,
    /// Submission will be refused while this is set.
    pub over_limit: bool,
}

/// Holds at most one staged upload.
#[derive(Debug, Clone)]
pub struct UploadStage {
    slot: Option<StagedUpload>,
    max_upload_size: u64,
}

impl UploadStage {
    pub fn new(max_upload_size: u64) -> Self {
        Self {
            slot: None,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Stage a loose file selection, replacing anything staged before.
    pub fn stage_files(&mut self, entries: &[RawEntry]) -> Result<StageSummary> {
        let files = build_file_tree(entries).ok_or(UptreeError::EmptySelection)?;
        Ok(self.put(StagedUpload::Files(files)))
    }

    /// Stage a directory selection, replacing anything staged before.
    pub fn stage_folder(&mut self, entries: &[RawEntry]) -> Result<StageSummary> {
        let upload = build_folder_tree(entries).ok_or(UptreeError::EmptySelection)?;
        Ok(self.put(StagedUpload::Folder(upload)))
    }

    fn put(&mut self, staged: StagedUpload) -> StageSummary {
        let summary = staged.summary(self.max_upload_size);
        if summary.over_limit {
            warn!(
                total_size = summary.total_size,
                limit = self.max_upload_size,
                "staged upload is over the size limit"
            );
        } else {
            debug!(kind = ?summary.kind, total_size = summary.total_size, "staged upload");
        }
        self.slot = Some(staged);
        summary
    }

    pub fn staged(&self) -> Option<&StagedUpload> {
        self.slot.as_ref()
    }

    pub fn is_staged(&self) -> bool {
        self.slot.is_some()
    }

    pub fn summary(&self) -> Option<StageSummary> {
        self.slot
            .as_ref()
            .map(|staged| staged.summary(self.max_upload_size))
    }

    /// The staged upload, if one exists and is within the size limit.
    pub fn ready(&self) -> Result<&StagedUpload> {
        let staged = self.slot.as_ref().ok_or(UptreeError::EmptySelection)?;
        staged.check_limit(self.max_upload_size)?;
        Ok(staged)
    }

    /// Discard the staged upload.
    pub fn cancel(&mut self) -> Option<StagedUpload> {
        self.slot.take()
    }
}
