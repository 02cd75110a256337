use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuditError;

/// Run configuration, loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root_directory: PathBuf,
    pub ignore_list: HashSet<String>,
    pub writable_only: bool,
    pub min_report_gb: f64,
    pub threads: usize,
    pub output_csv: PathBuf,
    pub report_bytes: bool,
    pub report_gb: bool,
    pub report_file_count: bool,
    pub report_write_access: bool,
    /// `None` disables long-path warnings (max_path_length = -1).
    pub max_path_length: Option<usize>,
}

impl ScanConfig {
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let content = fs::read_to_string(path).map_err(|e| AuditError::Config {
            path: path.to_path_buf(),
            reason: format!("cannot read file: {e}"),
        })?;

        Self::parse(&content).map_err(|reason| AuditError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let mut map = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            // Section headers from the old INI layout are tolerated
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            if let Some((k, v)) = line.split_once('=') {
                let key = k.trim().to_string();
                let val = v.trim().trim_matches('"').to_string();
                map.insert(key, val);
            }
        }

        let root_directory = map
            .get("root_directory")
            .ok_or_else(|| "root_directory is required".to_string())?;

        let threads = get_parsed(&map, "threads", 1usize)?;
        if threads == 0 {
            return Err("threads: must be at least 1".to_string());
        }

        let min_report_gb = get_parsed(&map, "min_report_gb", 0.0f64)?;
        if min_report_gb < 0.0 {
            return Err("min_report_gb: must not be negative".to_string());
        }

        let max_path_length = match get_parsed(&map, "max_path_length", -1i64)? {
            -1 => None,
            n if n < 0 => {
                return Err(format!(
                    "max_path_length: expected -1 or a non-negative length, got {n}"
                ));
            }
            n => Some(n as usize),
        };

        let ignore_list = map
            .get("ignore_list")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ScanConfig {
            root_directory: PathBuf::from(root_directory),
            ignore_list,
            writable_only: get_bool(&map, "writable_only", false)?,
            min_report_gb,
            threads,
            output_csv: map
                .get("output_csv")
                .map_or_else(|| PathBuf::from("directory_sizes.csv"), PathBuf::from),
            report_bytes: get_bool(&map, "report_bytes", true)?,
            report_gb: get_bool(&map, "report_gb", true)?,
            report_file_count: get_bool(&map, "report_file_count", false)?,
            report_write_access: get_bool(&map, "report_write_access", false)?,
            max_path_length,
        })
    }
}

fn get_bool(map: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, String> {
    match map.get(key) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            other => Err(format!("{key}: expected a boolean, got '{other}'")),
        },
    }
}

fn get_parsed<T: std::str::FromStr>(
    map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, String> {
    match map.get(key) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| format!("{key}: invalid value '{v}'")),
    }
}
