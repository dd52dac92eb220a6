//! Object storage for uptree.
//!
//! Objects are addressed by slash-separated keys and stored as plain files
//! below a base directory:
//! ```text
//! {base_path}/
//! └── uploads/
//!     └── {owner}/
//!         ├── report.csv
//!         └── photos/
//!             └── 2024/beach.jpg
//! ```

use std::io;
use std::path::{Path, PathBuf};

use crate::{Result, UptreeError};

/// Local object store keyed by normalized paths.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    base_path: PathBuf,
}

impl ObjectStore {
    /// Create a store rooted at `base_path`.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Collapse repeated slashes and strip leading and trailing ones.
    ///
    /// Keys that are empty or contain `.` or `..` segments are rejected.
    pub fn normalize_key(key: &str) -> Result<String> {
        let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(UptreeError::Validation("empty object key".to_string()));
        }
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(UptreeError::Validation(format!(
                "object key '{key}' escapes its namespace"
            )));
        }
        Ok(segments.join("/"))
    }

    /// Key of an uploaded object: `uploads/{owner}/{path}`.
    pub fn upload_key(owner: &str, path: &str) -> Result<String> {
        Self::normalize_key(&format!("uploads/{owner}/{path}"))
    }

    /// Filesystem location of a normalized key.
    pub fn get_object_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.base_path.clone(), |path, segment| path.join(segment))
    }

    /// Store `content` under `key`, replacing any previous object.
    pub async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        let key = Self::normalize_key(key)?;
        let path = self.get_object_path(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;

        Ok(())
    }

    /// Load the object stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let key = Self::normalize_key(key)?;
        match tokio::fs::read(self.get_object_path(&key)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(UptreeError::NotFound(format!("object {key}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the object stored under `key`.
    ///
    /// Returns `false` if it didn't exist.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let key = Self::normalize_key(key)?;
        match tokio::fs::remove_file(self.get_object_path(&key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether an object exists under `key`.
    pub async fn exists(&self, key: &str) -> bool {
        match Self::normalize_key(key) {
            Ok(key) => tokio::fs::metadata(self.get_object_path(&key))
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Size of the object stored under `key`.
    pub async fn size(&self, key: &str) -> Result<u64> {
        let key = Self::normalize_key(key)?;
        match tokio::fs::metadata(self.get_object_path(&key)).await {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(UptreeError::NotFound(format!("object {key}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
