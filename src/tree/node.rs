//! File and folder node types.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Result, UptreeError};

/// Handle to the content of a file that has not been uploaded yet.
///
/// Cloning is cheap: in-memory content is shared and on-disk content is only
/// referenced by path until it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Content already held in memory.
    Memory(Arc<[u8]>),
    /// Content stored in a local file.
    Disk(PathBuf),
}

impl Payload {
    /// Wrap in-memory content.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Payload::Memory(Arc::from(bytes.into()))
    }

    /// Read the full content.
    pub async fn read(&self) -> Result<Vec<u8>> {
        match self {
            Payload::Memory(bytes) => Ok(bytes.to_vec()),
            Payload::Disk(path) => match tokio::fs::read(path).await {
                Ok(content) => Ok(content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(UptreeError::NotFound(format!("file {}", path.display())))
                }
                Err(e) => Err(e.into()),
            },
        }
    }
}

/// A file leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// File name, equal to the last segment of its path.
    pub name: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Path of the containing directory (folder uploads) or the file's own
    /// browser-relative path (loose uploads).
    pub relative_path: String,
    /// Content handle, present only before upload.
    #[serde(skip)]
    pub payload: Option<Payload>,
    /// Identifier assigned by the backend after upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl FileEntry {
    /// Create a file entry without payload or identifier.
    pub fn new(name: impl Into<String>, file_size: u64, relative_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_size,
            relative_path: relative_path.into(),
            payload: None,
            id: None,
        }
    }

    /// Attach a content handle.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A folder with its children keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderEntry {
    /// Folder name.
    pub name: String,
    /// Path of the folder itself, without leading or trailing slash.
    pub relative_path: String,
    /// Sum of the sizes of every file below this folder.
    pub total_size: u64,
    /// Immediate children keyed by name.
    #[serde(default)]
    pub children: BTreeMap<String, Node>,
    /// Identifier assigned by the backend after upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl FolderEntry {
    /// Create an empty folder.
    pub fn new(name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            total_size: 0,
            children: BTreeMap::new(),
            id: None,
        }
    }

    /// Children as a list, in key order.
    pub fn child_nodes(&self) -> Vec<Node> {
        self.children.values().cloned().collect()
    }

    /// Number of files anywhere below this folder.
    pub fn file_count(&self) -> usize {
        self.children
            .values()
            .map(|child| match child {
                Node::File(_) => 1,
                Node::Folder(folder) => folder.file_count(),
            })
            .sum()
    }

    /// Drop every payload handle below this folder.
    pub fn strip_payloads(&mut self) {
        for child in self.children.values_mut() {
            child.strip_payloads();
        }
    }

    /// Recompute totals bottom-up and compare them with the stored ones.
    ///
    /// Returns the recomputed total of this folder, or a validation error
    /// naming the first folder whose stored total disagrees.
    pub fn verify_totals(&self) -> Result<u64> {
        let mut sum = 0u64;
        for child in self.children.values() {
            sum += match child {
                Node::File(file) => file.file_size,
                Node::Folder(folder) => folder.verify_totals()?,
            };
        }
        if sum != self.total_size {
            return Err(UptreeError::Validation(format!(
                "folder '{}' records {} bytes but holds {} bytes",
                self.relative_path, self.total_size, sum
            )));
        }
        Ok(sum)
    }
}

/// A node in an upload tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    File(FileEntry),
    Folder(FolderEntry),
}

impl Node {
    /// Name of the file or folder.
    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Folder(folder) => &folder.name,
        }
    }

    /// Stored path: the containing directory or picker path for files,
    /// the folder's own path for folders.
    pub fn relative_path(&self) -> &str {
        match self {
            Node::File(file) => &file.relative_path,
            Node::Folder(folder) => &folder.relative_path,
        }
    }

    /// File size for files, aggregated total for folders.
    pub fn size(&self) -> u64 {
        match self {
            Node::File(file) => file.file_size,
            Node::Folder(folder) => folder.total_size,
        }
    }

    /// Identifier assigned by the backend, `None` until persisted.
    pub fn id(&self) -> Option<&str> {
        match self {
            Node::File(file) => file.id.as_deref(),
            Node::Folder(folder) => folder.id.as_deref(),
        }
    }

    /// Whether this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder(_))
    }

    /// Drop payload handles from this node and its descendants.
    pub fn strip_payloads(&mut self) {
        match self {
            Node::File(file) => file.payload = None,
            Node::Folder(folder) => folder.strip_payloads(),
        }
    }
}

impl From<FileEntry> for Node {
    fn from(file: FileEntry) -> Self {
        Node::File(file)
    }
}

impl From<FolderEntry> for Node {
    fn from(folder: FolderEntry) -> Self {
        Node::Folder(folder)
    }
}
