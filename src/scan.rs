use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::warn;

use crate::aggregate::{self, DirectoryResult};
use crate::config::ScanConfig;
use crate::error::AuditError;

/// Lists the root's immediate subdirectories, filters ignored names and
/// aggregates each remaining one, in parallel when `threads > 1`. Results
/// come back in filesystem-listing order regardless of worker count.
pub fn scan_root(config: &ScanConfig) -> Result<Vec<DirectoryResult>, AuditError> {
    let targets = list_targets(config)?;

    let mut results = if config.threads <= 1 {
        targets
            .iter()
            .map(|(name, path)| aggregate::aggregate_directory(name, path, config))
            .collect()
    } else {
        aggregate_parallel(&targets, config)
    };

    for result in &results {
        if let Some(err) = &result.error {
            warn!("degraded result for '{}': {err}", result.name);
        }
    }

    if config.writable_only {
        results.retain(|r| r.writable);
    }

    Ok(results)
}

fn list_targets(config: &ScanConfig) -> Result<Vec<(String, PathBuf)>, AuditError> {
    let root = &config.root_directory;
    let entries = fs::read_dir(root).map_err(|source| AuditError::RootInaccessible {
        path: root.clone(),
        source,
    })?;

    let mut targets = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AuditError::RootInaccessible {
            path: root.clone(),
            source,
        })?;

        // file_type() does not follow symlinks, so a symlinked directory
        // at the root level is not treated as a scan target
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if config.ignore_list.contains(&name) {
            continue;
        }
        targets.push((name, entry.path()));
    }
    Ok(targets)
}

/// Fixed pool of scoped worker threads pulling target indices from a
/// shared counter. Each result lands in its original slot, so the final
/// order is the listing order, never completion order. The slot vector
/// is the single synchronization point.
fn aggregate_parallel(targets: &[(String, PathBuf)], config: &ScanConfig) -> Vec<DirectoryResult> {
    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<DirectoryResult>>> = Mutex::new(vec![None; targets.len()]);
    let workers = config.threads.min(targets.len().max(1));

    thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| {
                loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    let Some((name, path)) = targets.get(i) else {
                        break;
                    };
                    let result = aggregate::aggregate_directory(name, path, config);
                    slots.lock().unwrap()[i] = Some(result);
                }
            });
        }
    });

    slots.into_inner().unwrap().into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    fn test_config(root: &Path) -> ScanConfig {
        ScanConfig {
            root_directory: root.to_path_buf(),
            ignore_list: HashSet::new(),
            writable_only: false,
            min_report_gb: 0.0,
            threads: 1,
            output_csv: PathBuf::from("directory_sizes.csv"),
            report_bytes: true,
            report_gb: true,
            report_file_count: false,
            report_write_access: false,
            max_path_length: None,
        }
    }

    fn write_file(path: &Path, bytes: usize) {
        let mut f = File::create(path).unwrap();
        f.write_all(&vec![0u8; bytes]).unwrap();
    }

    fn build_tree(root: &Path) {
        fs::create_dir_all(root.join("alpha/nested")).unwrap();
        write_file(&root.join("alpha/one.bin"), 500);
        write_file(&root.join("alpha/nested/two.bin"), 500);
        fs::create_dir(root.join("beta")).unwrap();
        fs::create_dir(root.join("gamma")).unwrap();
        write_file(&root.join("gamma/three.bin"), 42);
        // non-directory entries at the root level are ignored
        write_file(&root.join("stray.txt"), 9999);
    }

    #[test]
    fn test_scan_aggregates_all_directories() {
        let dir = tempfile::tempdir().unwrap();
        build_tree(dir.path());

        let mut results = scan_root(&test_config(dir.path())).unwrap();
        results.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "alpha");
        assert_eq!(results[0].bytes, 1000);
        assert_eq!(results[0].file_count, 2);
        assert_eq!(results[1].name, "beta");
        assert_eq!(results[1].bytes, 0);
        assert_eq!(results[2].name, "gamma");
        assert_eq!(results[2].bytes, 42);
    }

    #[test]
    fn test_scan_filters_ignored_names() {
        let dir = tempfile::tempdir().unwrap();
        build_tree(dir.path());

        let mut config = test_config(dir.path());
        config.ignore_list.insert("gamma".to_string());

        let results = scan_root(&config).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.name != "gamma"));
    }

    #[test]
    fn test_scan_parallel_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        build_tree(dir.path());

        let sequential = scan_root(&test_config(dir.path())).unwrap();

        let mut config = test_config(dir.path());
        config.threads = 4;
        let parallel = scan_root(&config).unwrap();

        // same values in the same (listing) order
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.root_directory = dir.path().join("does-not-exist");

        let err = scan_root(&config).unwrap_err();
        assert!(matches!(err, AuditError::RootInaccessible { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_writable_only_filters() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("open")).unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let mut config = test_config(dir.path());
        config.writable_only = true;

        let results = scan_root(&config).unwrap();

        // restore so the tempdir can be cleaned up
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "open");
        assert!(results[0].writable);
    }
}
