use std::fs;
use std::path::Path;

use crate::config::ScanConfig;
use crate::walker;

const GIB: f64 = 1_073_741_824.0;

/// Totals for one top-level directory. `long_paths` feeds console
/// warnings only and is never persisted; `error` marks a degraded result.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryResult {
    pub name: String,
    pub bytes: u64,
    pub file_count: u64,
    pub writable: bool,
    pub long_paths: Vec<String>,
    pub error: Option<String>,
}

impl DirectoryResult {
    #[must_use]
    pub fn gigabytes(&self) -> f64 {
        self.bytes as f64 / GIB
    }
}

/// Walks one top-level directory and reduces it to a single result. Any
/// failure to open the directory as a whole degrades the result instead
/// of propagating; unreadable entries inside it are skipped by the walker.
#[must_use]
pub fn aggregate_directory(name: &str, path: &Path, config: &ScanConfig) -> DirectoryResult {
    let mut result = DirectoryResult {
        name: name.to_string(),
        bytes: 0,
        file_count: 0,
        writable: false,
        long_paths: Vec::new(),
        error: None,
    };

    match fs::metadata(path) {
        Ok(m) if m.is_dir() => {}
        Ok(_) => {
            result.error = Some(format!("{} is no longer a directory", path.display()));
            return result;
        }
        Err(e) => {
            result.error = Some(format!("cannot read {}: {e}", path.display()));
            return result;
        }
    }

    if config.writable_only || config.report_write_access {
        result.writable = is_writable(path);
    }

    for (file, size) in walker::walk_files(path) {
        result.bytes += size;
        result.file_count += 1;

        if let Some(max) = config.max_path_length {
            let text = file.to_string_lossy();
            if text.len() > max {
                result.long_paths.push(text.into_owned());
            }
        }
    }

    result
}

/// Single non-destructive probe of the directory's own permission bits,
/// not a trial write and not a per-file audit.
fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}
