//! Upload tree construction.
//!
//! This module turns flat file selections into upload trees:
//! - Folder selections become one root folder with aggregated sizes
//! - Loose selections become a flat list of files
//! - Local directories can be scanned into selections

mod builder;
mod node;
mod scan;

pub use builder::{build_file_tree, build_folder_tree, FolderUpload, RawEntry};
pub use node::{FileEntry, FolderEntry, Node, Payload};
pub use scan::{scan_dir, scan_files};
