//! Common file system operations with unified error handling

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{Result, fs as fs_err};

/// Ensure parent directory exists for a path
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| fs_err::write_failed(parent, &e))?;
    }
    Ok(())
}

/// Read a text file
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| fs_err::read_failed(path, &e))
}

/// Write a text file atomically
///
/// The content goes to a temporary file next to the target, which then
/// replaces the target in a single rename.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| fs_err::write_failed(path, &e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| fs_err::write_failed(path, &e))?;
    temp.persist(path)
        .map_err(|e| fs_err::write_failed(path, &e.error))?;
    Ok(())
}

/// Copy a single file, creating the target directory
pub fn copy_file(source: &Path, target: &Path) -> Result<()> {
    ensure_parent_dir(target)?;
    std::fs::copy(source, target)
        .map_err(|e| fs_err::write_failed(target, &e))
        .map(|_| ())
}

/// Remove a file, reporting whether it existed
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_err::write_failed(path, &e)),
    }
}

/// First file called `name` below any of `dirs`, searched recursively
pub fn find_in_dirs(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter().find_map(|dir| {
        let mut hits: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == name)
            .map(walkdir::DirEntry::into_path)
            .collect();
        hits.sort();
        hits.into_iter().next()
    })
}

/// Every file below `root` as a sorted list of forward-slash relative paths
pub fn files_under(root: &Path) -> Vec<String> {
    if !root.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(to_forward_slashes)
        })
        .collect();
    files.sort();
    files
}

/// Convert a path to forward slashes for platform-independent names
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// File name component as an owned string
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
