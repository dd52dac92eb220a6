//! Tree construction from flat file selections.

use tracing::{debug, warn};

use super::node::{FileEntry, FolderEntry, Node, Payload};

/// One selected file as delivered by a file picker.
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// File name.
    pub name: String,
    /// Picker-relative path, `root/seg/.../name` for directory selections and
    /// empty for loose files.
    pub relative_path: String,
    /// Size in bytes.
    pub size: u64,
    /// Content handle.
    pub payload: Payload,
}

impl RawEntry {
    /// Entry from a directory selection; the name is the last path segment.
    pub fn new(relative_path: impl Into<String>, size: u64, payload: Payload) -> Self {
        let relative_path = relative_path.into();
        let name = segments(&relative_path)
            .last()
            .map(|s| s.to_string())
            .unwrap_or_default();
        Self {
            name,
            relative_path,
            size,
            payload,
        }
    }

    /// Loose file selected without directory context.
    pub fn loose(name: impl Into<String>, size: u64, payload: Payload) -> Self {
        Self {
            name: name.into(),
            relative_path: String::new(),
            size,
            payload,
        }
    }
}

/// Result of building a folder upload.
#[derive(Debug, Clone)]
pub struct FolderUpload {
    /// Root folder of the selection.
    pub root: FolderEntry,
    /// Content handles in selection order.
    pub payloads: Vec<Payload>,
    /// Upload path of each file, aligned with `payloads`.
    pub upload_paths: Vec<String>,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Build a folder tree from a directory selection.
///
/// The root is named after the first segment of the first entry. Every other
/// entry is placed below it regardless of its own first segment. Returns
/// `None` for an empty selection.
pub fn build_folder_tree(entries: &[RawEntry]) -> Option<FolderUpload> {
    let root_name = entries
        .iter()
        .find_map(|entry| segments(&entry.relative_path).next())?
        .to_string();

    let mut root = FolderEntry::new(root_name.clone(), root_name);
    let mut payloads = Vec::with_capacity(entries.len());
    let mut upload_paths = Vec::with_capacity(entries.len());

    for entry in entries {
        let parts: Vec<&str> = segments(&entry.relative_path).collect();
        let [_, dirs @ .., file_name] = parts.as_slice() else {
            warn!(path = %entry.relative_path, "skipping entry without a directory component");
            continue;
        };
        let file_path = insert_file(&mut root, dirs, file_name, entry);

        payloads.push(entry.payload.clone());
        upload_paths.push(format!("{file_path}/{file_name}"));
    }

    debug!(
        root = %root.name,
        files = payloads.len(),
        total_size = root.total_size,
        "built folder tree"
    );

    Some(FolderUpload {
        root,
        payloads,
        upload_paths,
    })
}

/// Place a file below `folder`, creating intermediate folders on demand.
///
/// Sizes are settled on the way back up, so each ancestor is adjusted exactly
/// once per file. A replaced sibling has its size taken back out of the chain.
/// Returns the relative path of the file's parent folder.
fn insert_file(folder: &mut FolderEntry, dirs: &[&str], file_name: &str, entry: &RawEntry) -> String {
    let (added, removed, parent_path) = place(folder, dirs, file_name, entry);
    folder.total_size = folder.total_size + added - removed;
    parent_path
}

fn place(
    folder: &mut FolderEntry,
    dirs: &[&str],
    file_name: &str,
    entry: &RawEntry,
) -> (u64, u64, String) {
    match dirs.split_first() {
        None => {
            let leaf = FileEntry::new(file_name, entry.size, folder.relative_path.clone())
                .with_payload(entry.payload.clone());
            let replaced = folder
                .children
                .insert(file_name.to_string(), Node::File(leaf))
                .map_or(0, |old| old.size());
            (entry.size, replaced, folder.relative_path.clone())
        }
        Some((dir, rest)) => {
            let mut replaced = 0;
            let mut child = match folder.children.remove(*dir) {
                Some(Node::Folder(existing)) => existing,
                other => {
                    replaced = other.map_or(0, |old| old.size());
                    FolderEntry::new(*dir, format!("{}/{}", folder.relative_path, dir))
                }
            };

            let (added, removed, parent_path) = place(&mut child, rest, file_name, entry);
            child.total_size = child.total_size + added - removed;
            folder.children.insert(dir.to_string(), Node::Folder(child));
            (added, removed + replaced, parent_path)
        }
    }
}

/// Build a flat list of files from a loose selection.
///
/// Each file keeps the picker's relative path, or its own name when the
/// picker gave none. Returns `None` for an empty selection.
pub fn build_file_tree(entries: &[RawEntry]) -> Option<Vec<FileEntry>> {
    if entries.is_empty() {
        return None;
    }

    let files = entries
        .iter()
        .map(|entry| {
            let relative_path = if entry.relative_path.is_empty() {
                entry.name.clone()
            } else {
                entry.relative_path.clone()
            };
            FileEntry::new(entry.name.clone(), entry.size, relative_path)
                .with_payload(entry.payload.clone())
        })
        .collect();

    Some(files)
}
