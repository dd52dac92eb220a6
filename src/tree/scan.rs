//! Local filesystem selection.
//!
//! Produces the same raw entries a browser picker would: a directory
//! selection yields `dir_name/sub/.../file` paths, a file selection yields
//! loose entries.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::builder::RawEntry;
use super::node::Payload;
use crate::{Result, UptreeError};

/// Select every regular file below `dir`, in sorted path order.
///
/// Symbolic links and other special files are ignored. Files whose path is
/// not valid UTF-8 cannot be named in an upload and are left out with a
/// warning.
pub fn scan_dir(dir: &Path) -> Result<Vec<RawEntry>> {
    let root_name = dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            UptreeError::Validation(format!("cannot select directory {}", dir.display()))
        })?
        .to_string();

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(dir).map_err(|_| {
            UptreeError::Validation(format!(
                "{} is outside {}",
                entry.path().display(),
                dir.display()
            ))
        })?;
        let Some(segments) = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
        else {
            warn!(path = %entry.path().display(), "skipping file with non UTF-8 name");
            continue;
        };

        let size = entry.metadata().map_err(std::io::Error::from)?.len();
        entries.push(RawEntry::new(
            format!("{root_name}/{}", segments.join("/")),
            size,
            Payload::Disk(entry.path().to_path_buf()),
        ));
    }

    debug!(dir = %dir.display(), files = entries.len(), "scanned directory");
    Ok(entries)
}

/// Select individual files as loose entries.
pub fn scan_files(paths: &[PathBuf]) -> Result<Vec<RawEntry>> {
    paths
        .iter()
        .map(|path| {
            let metadata = fs::metadata(path)?;
            if !metadata.is_file() {
                return Err(UptreeError::Validation(format!(
                    "{} is not a regular file",
                    path.display()
                )));
            }
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| {
                    UptreeError::Validation(format!("cannot select file {}", path.display()))
                })?;
            Ok(RawEntry::loose(
                name,
                metadata.len(),
                Payload::Disk(path.clone()),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_tree() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("photos");
        fs::create_dir_all(root.join("2024/summer")).unwrap();
        fs::write(root.join("2024/summer/beach.jpg"), vec![1u8; 10]).unwrap();
        fs::write(root.join("2024/index.txt"), b"hello").unwrap();
        fs::write(root.join("readme.md"), b"abc").unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_scan_dir_paths_and_sizes() {
        let (_temp_dir, root) = setup_tree();

        let entries = scan_dir(&root).unwrap();

        let paths: Vec<_> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "photos/2024/index.txt",
                "photos/2024/summer/beach.jpg",
                "photos/readme.md"
            ]
        );
        assert_eq!(entries[1].name, "beach.jpg");
        assert_eq!(entries[1].size, 10);
        assert_eq!(
            entries[1].payload,
            Payload::Disk(root.join("2024/summer/beach.jpg"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_dir_skips_symlinks() {
        let (_temp_dir, root) = setup_tree();
        std::os::unix::fs::symlink(root.join("readme.md"), root.join("link.md")).unwrap();

        let entries = scan_dir(&root).unwrap();

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.name != "link.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_dir_leaves_out_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_temp_dir, root) = setup_tree();
        fs::write(root.join(OsStr::from_bytes(b"bad\xffname.txt")), b"x").unwrap();

        let entries = scan_dir(&root).unwrap();

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.relative_path.starts_with("photos/")));
    }

    #[test]
    fn test_scan_dir_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = scan_dir(&temp_dir.path().join("nope"));
        assert!(matches!(result, Err(UptreeError::Io(_))));
    }

    #[test]
    fn test_scan_files() {
        let (_temp_dir, root) = setup_tree();

        let entries = scan_files(&[root.join("readme.md")]).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "readme.md");
        assert_eq!(entries[0].relative_path, "");
        assert_eq!(entries[0].size, 3);
    }

    #[test]
    fn test_scan_files_rejects_directory() {
        let (_temp_dir, root) = setup_tree();

        let result = scan_files(&[root.join("2024")]);
        assert!(matches!(result, Err(UptreeError::Validation(_))));
    }
}
