//! uptree - folder-tree uploads with cached navigation
//!
//! Builds upload trees from flat file selections, stages and submits them to
//! a resource backend, and lets the user browse uploaded resources through a
//! breadcrumb cache that never refetches.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod tree;
pub mod upload;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Result, UptreeError};
pub use navigation::NavigationCache;
pub use tree::{build_file_tree, build_folder_tree, FileEntry, FolderEntry, Node, RawEntry};
pub use upload::{LocalBackend, ResourceBackend, UploadStage};
