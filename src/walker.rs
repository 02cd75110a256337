use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

/// Lazily yields `(path, size)` for every regular file under `dir`, at any
/// nesting depth. Symlinks are never descended into as directories; a
/// symlink whose target resolves to a regular file contributes the
/// target's size. Unreadable entries are skipped and logged, the walk
/// itself never fails.
pub fn walk_files(dir: &Path) -> impl Iterator<Item = (PathBuf, u64)> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter_map(|entry| {
            let file_type = entry.file_type();
            if file_type.is_file() {
                match entry.metadata() {
                    Ok(m) => Some((entry.into_path(), m.len())),
                    Err(err) => {
                        debug!("skipping {}: {err}", entry.path().display());
                        None
                    }
                }
            } else if file_type.is_symlink() {
                let path = entry.into_path();
                // fs::metadata follows the link; broken links are skipped
                match fs::metadata(&path) {
                    Ok(m) if m.is_file() => Some((path, m.len())),
                    Ok(_) => None,
                    Err(err) => {
                        debug!("skipping {}: {err}", path.display());
                        None
                    }
                }
            } else {
                None
            }
        })
}
