//! Resource backends.
//!
//! A backend lists the resources already uploaded by the current owner and
//! accepts new uploads, returning the persisted records with identifiers.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::storage::ObjectStore;
use crate::config::FilesConfig;
use crate::tree::{FileEntry, FolderEntry, Node, Payload};
use crate::{Result, UptreeError};

/// Remote side of the upload workflow.
#[allow(async_fn_in_trait)]
pub trait ResourceBackend {
    /// Root-level resources of the current owner.
    async fn fetch_resources(&self) -> Result<Vec<Node>>;

    /// Upload loose files. `files` carry no payloads; `payloads` holds the
    /// content of each file at the same position.
    async fn upload_files(&self, files: &[FileEntry], payloads: &[Payload])
        -> Result<Vec<FileEntry>>;

    /// Upload a folder tree. `payloads[i]` is stored at `paths[i]`.
    async fn upload_folder(
        &self,
        root: &FolderEntry,
        payloads: &[Payload],
        paths: &[String],
    ) -> Result<FolderEntry>;
}

/// A persisted resource in the owner's manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceRecord {
    owner_id: String,
    created_at: DateTime<Utc>,
    node: Node,
}

/// Backend storing objects in an [`ObjectStore`] and metadata in a JSON
/// manifest per owner.
#[derive(Debug)]
pub struct LocalBackend {
    store: ObjectStore,
    owner: String,
    manifest: Mutex<()>,
}

impl LocalBackend {
    pub fn new(store: ObjectStore, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
            manifest: Mutex::new(()),
        }
    }

    /// Open the store described by the `[files]` configuration section.
    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        let store = ObjectStore::new(&config.storage_path)?;
        Ok(Self::new(store, config.owner.clone()))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    fn manifest_path(&self) -> PathBuf {
        self.store
            .base_path()
            .join("manifests")
            .join(format!("{}.json", self.owner))
    }

    async fn read_records(&self) -> Result<Vec<ResourceRecord>> {
        match tokio::fs::read(self.manifest_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn append_records(&self, nodes: &[Node]) -> Result<()> {
        let _guard = self.manifest.lock().await;
        let mut records = self.read_records().await?;
        let created_at = Utc::now();
        records.extend(nodes.iter().map(|node| ResourceRecord {
            owner_id: self.owner.clone(),
            created_at,
            node: node.clone(),
        }));

        let path = self.manifest_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write then rename so a crash never leaves a truncated manifest.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&records)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Object path of a loose file.
    ///
    /// Loose files carry a picker path that may already end in their own
    /// name; otherwise the name is appended.
    fn loose_path(file: &FileEntry) -> String {
        let relative = file.relative_path.trim_end_matches('/');
        if relative == file.name || relative.ends_with(&format!("/{}", file.name)) {
            relative.to_string()
        } else {
            format!("{relative}/{}", file.name)
        }
    }
}

fn check_payload_name(index: usize, name: &str, payload: &Payload) -> Result<()> {
    if let Payload::Disk(path) = payload {
        let file_name = path.file_name().and_then(|n| n.to_str());
        if file_name != Some(name) {
            return Err(UptreeError::Validation(format!(
                "filename mismatch at index {index}"
            )));
        }
    }
    Ok(())
}

impl ResourceBackend for LocalBackend {
    async fn fetch_resources(&self) -> Result<Vec<Node>> {
        let mut records = self.read_records().await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let (folders, files): (Vec<_>, Vec<_>) = records
            .into_iter()
            .map(|record| record.node)
            .partition(Node::is_folder);

        debug!(
            owner = %self.owner,
            folders = folders.len(),
            files = files.len(),
            "fetched resources"
        );
        Ok(folders.into_iter().chain(files).collect())
    }

    async fn upload_files(
        &self,
        files: &[FileEntry],
        payloads: &[Payload],
    ) -> Result<Vec<FileEntry>> {
        if files.len() != payloads.len() {
            return Err(UptreeError::Validation(
                "files and payloads count mismatch".to_string(),
            ));
        }

        let mut persisted = Vec::with_capacity(files.len());
        for (index, (file, payload)) in files.iter().zip(payloads).enumerate() {
            check_payload_name(index, &file.name, payload)?;

            let key = ObjectStore::upload_key(&self.owner, &Self::loose_path(file))?;
            let content = payload.read().await?;
            self.store.put(&key, &content).await?;
            debug!(%key, size = content.len(), "stored file");

            let mut record = file.clone();
            record.payload = None;
            record.id = Some(Uuid::new_v4().to_string());
            persisted.push(record);
        }

        let nodes: Vec<Node> = persisted.iter().cloned().map(Node::File).collect();
        self.append_records(&nodes).await?;
        info!(owner = %self.owner, count = persisted.len(), "uploaded files");
        Ok(persisted)
    }

    async fn upload_folder(
        &self,
        root: &FolderEntry,
        payloads: &[Payload],
        paths: &[String],
    ) -> Result<FolderEntry> {
        if payloads.len() != paths.len() {
            return Err(UptreeError::Validation(
                "paths length must match number of files".to_string(),
            ));
        }

        for (payload, path) in payloads.iter().zip(paths) {
            let key = ObjectStore::upload_key(&self.owner, path)?;
            let content = payload.read().await?;
            self.store.put(&key, &content).await?;
            debug!(%key, size = content.len(), "stored file");
        }

        let mut record = root.clone();
        record.strip_payloads();
        record.relative_path = record.relative_path.trim_matches('/').to_string();
        record.id = Some(Uuid::new_v4().to_string());

        self.append_records(&[Node::Folder(record.clone())]).await?;
        info!(
            owner = %self.owner,
            folder = %record.name,
            files = payloads.len(),
            total_size = record.total_size,
            "uploaded folder"
        );
        Ok(record)
    }
}
