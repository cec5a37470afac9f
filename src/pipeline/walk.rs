//! Enumeration of the files to inventory.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::utils::filesystem::is_hidden;

/// Every regular, non-hidden file under `root`, in a stable order.
///
/// Hidden entries are pruned at every depth, so nothing inside a hidden
/// directory is listed. The root itself is never treated as hidden. Symbolic
/// links to regular files are listed under the link's own path; links to
/// directories are not descended into, and dangling links are skipped. Entries
/// that cannot be read are logged and skipped.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

    for entry in walker {
        match entry {
            Ok(entry) if is_listed(&entry) => files.push(entry.into_path()),
            Ok(entry) if entry.path_is_symlink() => {
                info!(
                    path = %entry.path().display(),
                    "skipping link that does not point to a regular file"
                )
            }
            Ok(entry) => debug!(path = %entry.path().display(), "skipping non-regular entry"),
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!(path = %path, error = %err, "skipping unreadable entry");
            }
        }
    }

    files
}

fn is_listed(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }

    entry.path_is_symlink()
        && std::fs::metadata(entry.path()).is_ok_and(|target| target.is_file())
}
