//! Upload dashboard session.
//!
//! Ties the backend, the staging slot and the navigation cache together.
//! The cache is only written after the backend confirms a call, so a failed
//! fetch or upload leaves both cache and staged upload as they were.

use tracing::{error, info, warn};

use crate::config::Config;
use crate::navigation::NavigationCache;
use crate::tree::{FileEntry, Node, Payload, RawEntry};
use crate::upload::{ResourceBackend, StageSummary, StagedUpload, UploadStage};
use crate::{Result, UptreeError};

/// One browsing and upload session.
pub struct Dashboard<B> {
    backend: B,
    cache: NavigationCache,
    stage: UploadStage,
}

impl<B: ResourceBackend> Dashboard<B> {
    pub fn new(backend: B, root_label: impl Into<String>, max_upload_size: u64) -> Self {
        Self {
            backend,
            cache: NavigationCache::new(root_label),
            stage: UploadStage::new(max_upload_size),
        }
    }

    pub fn from_config(backend: B, config: &Config) -> Self {
        Self::new(
            backend,
            config.navigation.root_label.clone(),
            config.files.max_upload_size_bytes(),
        )
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn navigation(&self) -> &NavigationCache {
        &self.cache
    }

    pub fn displayed(&self) -> &[Node] {
        self.cache.displayed()
    }

    pub fn staged(&self) -> Option<&StagedUpload> {
        self.stage.staged()
    }

    /// Fetch the root listing and seed the cache with it.
    ///
    /// Returns the number of root-level resources.
    pub async fn load(&mut self) -> Result<usize> {
        let nodes = self.backend.fetch_resources().await.inspect_err(|e| {
            warn!(error = %e, "failed to load resources");
        })?;
        let count = nodes.len();
        self.cache.seed_root(nodes);
        Ok(count)
    }

    /// Stage loose files.
    pub fn select_files(&mut self, entries: &[RawEntry]) -> Result<StageSummary> {
        self.stage.stage_files(entries)
    }

    /// Stage a directory selection.
    pub fn select_folder(&mut self, entries: &[RawEntry]) -> Result<StageSummary> {
        self.stage.stage_folder(entries)
    }

    /// Discard the staged upload. Returns whether anything was staged.
    pub fn cancel(&mut self) -> bool {
        self.stage.cancel().is_some()
    }

    /// Upload the staged selection and merge the persisted nodes.
    pub async fn submit(&mut self) -> Result<Vec<Node>> {
        let nodes = match self.stage.ready()? {
            StagedUpload::Files(files) => {
                let (metadata, payloads) = split_payloads(files)?;
                self.backend
                    .upload_files(&metadata, &payloads)
                    .await?
                    .into_iter()
                    .map(Node::File)
                    .collect::<Vec<_>>()
            }
            StagedUpload::Folder(upload) => {
                let folder = self
                    .backend
                    .upload_folder(&upload.root, &upload.payloads, &upload.upload_paths)
                    .await?;
                vec![Node::Folder(folder)]
            }
        };

        self.stage.cancel();
        let nodes: Vec<Node> = nodes
            .into_iter()
            .map(|mut node| {
                node.strip_payloads();
                node
            })
            .collect();
        self.cache.merge_upload_result(nodes.clone());
        info!(count = nodes.len(), "upload merged");
        Ok(nodes)
    }

    /// Open the displayed item at `index`.
    ///
    /// Returns `false` for files and empty folders.
    pub fn open(&mut self, index: usize) -> Result<bool> {
        let folder = match self.cache.displayed().get(index) {
            Some(Node::Folder(folder)) => folder.clone(),
            Some(Node::File(_)) => return Ok(false),
            None => {
                error!(
                    index,
                    len = self.cache.displayed().len(),
                    "no displayed item at index"
                );
                return Err(UptreeError::NavigationPrecondition(format!(
                    "no displayed item at index {index}"
                )))
            }
        };
        self.cache.open_folder(&folder)
    }

    /// Open the displayed folder called `name`.
    pub fn open_by_name(&mut self, name: &str) -> Result<bool> {
        let index = self
            .cache
            .displayed()
            .iter()
            .position(|node| node.is_folder() && node.name() == name)
            .ok_or_else(|| UptreeError::NotFound(format!("folder '{name}'")))?;
        self.open(index)
    }

    /// Jump to a breadcrumb.
    pub fn ascend(&mut self, target_index: usize) -> Result<()> {
        self.cache.ascend(target_index)
    }

    pub fn back(&mut self) -> Result<()> {
        self.cache.back()
    }

    /// End the session, dropping cached listings and any staged upload.
    pub fn teardown(&mut self) {
        self.stage.cancel();
        self.cache.clear();
    }
}

/// Split staged files into payload-free metadata and aligned payloads.
fn split_payloads(files: &[FileEntry]) -> Result<(Vec<FileEntry>, Vec<Payload>)> {
    let mut metadata = Vec::with_capacity(files.len());
    let mut payloads = Vec::with_capacity(files.len());
    for file in files {
        let payload = file.payload.clone().ok_or_else(|| {
            UptreeError::Validation(format!("file '{}' has no content", file.name))
        })?;
        let mut entry = file.clone();
        entry.payload = None;
        metadata.push(entry);
        payloads.push(payload);
    }
    Ok((metadata, payloads))
}
