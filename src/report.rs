use std::path::Path;

use chrono::Local;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Table};
use human_bytes::human_bytes;
use log::debug;

use crate::aggregate::DirectoryResult;
use crate::config::ScanConfig;
use crate::error::AuditError;

/// Writes the CSV report: a header row plus one row per result, with only
/// the enabled columns in the fixed order name, bytes, gb, file_count,
/// write_access. Any create/write/flush failure is fatal; the writer is
/// flushed explicitly so errors surface before success is reported.
pub fn write_csv(results: &[DirectoryResult], config: &ScanConfig) -> Result<(), AuditError> {
    let path = &config.output_csv;
    let mut writer = csv::Writer::from_path(path).map_err(|e| output_err(path, e))?;

    writer
        .write_record(header(config))
        .map_err(|e| output_err(path, e))?;
    for result in results {
        writer
            .write_record(row(result, config))
            .map_err(|e| output_err(path, e))?;
    }
    writer.flush().map_err(|e| output_err(path, e.into()))?;

    debug!("wrote {} rows to {}", results.len(), path.display());
    Ok(())
}

fn output_err(path: &Path, source: csv::Error) -> AuditError {
    AuditError::OutputWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn header(config: &ScanConfig) -> Vec<&'static str> {
    let mut cols = vec!["name"];
    if config.report_bytes {
        cols.push("bytes");
    }
    if config.report_gb {
        cols.push("gb");
    }
    if config.report_file_count {
        cols.push("file_count");
    }
    if config.report_write_access {
        cols.push("write_access");
    }
    cols
}

fn row(result: &DirectoryResult, config: &ScanConfig) -> Vec<String> {
    let mut fields = vec![result.name.clone()];
    if config.report_bytes {
        fields.push(result.bytes.to_string());
    }
    if config.report_gb {
        fields.push(format!("{:.2}", result.gigabytes()));
    }
    if config.report_file_count {
        fields.push(result.file_count.to_string());
    }
    if config.report_write_access {
        fields.push(result.writable.to_string());
    }
    fields
}

pub fn print_report(results: &[DirectoryResult], config: &ScanConfig, table: bool) {
    println!(
        "{}",
        format!(
            "=== Directory Size Report: {} ===",
            Local::now().format("%Y-%m-%d %H:%M")
        )
        .cyan()
    );

    for line in warning_lines(results) {
        println!("{} {line}", "WARNING:".yellow());
    }

    if table {
        print_table(results, config);
    } else {
        for line in size_lines(results, config) {
            println!("{line}");
        }
    }
}

/// Degraded-directory and over-length-path warnings, in result order.
/// Both go to stdout alongside the size lines so redirected console
/// output stays in one stream.
fn warning_lines(results: &[DirectoryResult]) -> Vec<String> {
    let mut lines = Vec::new();
    for result in results {
        if let Some(err) = &result.error {
            lines.push(format!("incomplete totals for '{}': {err}", result.name));
        }
        for path in &result.long_paths {
            lines.push(format!("path exceeds length limit: {path}"));
        }
    }
    lines
}

/// One "<name>: <size>" line per directory at or above the minimum
/// reporting size; a minimum of 0 keeps everything.
fn size_lines(results: &[DirectoryResult], config: &ScanConfig) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.gigabytes() >= config.min_report_gb)
        .map(|r| format!("{}: {}", r.name, human_bytes(r.bytes as f64)))
        .collect()
}

fn print_table(results: &[DirectoryResult], config: &ScanConfig) {
    let show_writable = config.report_write_access || config.writable_only;

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    let mut header = vec!["Directory", "Size", "Files"];
    if show_writable {
        header.push("Writable");
    }
    table.set_header(header);

    let mut total_bytes = 0u64;
    let mut total_files = 0u64;
    for result in results {
        total_bytes += result.bytes;
        total_files += result.file_count;

        let mut row = vec![
            Cell::new(&result.name),
            Cell::new(human_bytes(result.bytes as f64)),
            Cell::new(result.file_count),
        ];
        if show_writable {
            row.push(Cell::new(if result.writable { "yes" } else { "no" }));
        }
        table.add_row(row);
    }

    let mut totals = vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(human_bytes(total_bytes as f64)).add_attribute(Attribute::Bold),
        Cell::new(total_files).add_attribute(Attribute::Bold),
    ];
    if show_writable {
        totals.push(Cell::new(""));
    }
    table.add_row(totals);

    println!("{table}");
}
