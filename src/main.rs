mod aggregate;
mod config;
mod error;
mod report;
mod scan;
mod walker;

use std::path::Path;

use clap::Parser;
use colored::Colorize;

use crate::config::ScanConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Sums file sizes per top-level subdirectory and writes a CSV report", long_about = None)]
struct Args {
    /// Path to the key=value configuration file
    #[arg(default_value = "config.ini")]
    config: String,

    /// Render the console report as a summary table
    #[arg(long, short = 't')]
    table: bool,

    /// Log skipped entries and other scan details
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let config = match ScanConfig::load(Path::new(&args.config)) {
        Ok(c) => c,
        Err(e) => fatal(&e),
    };

    println!(
        "Step 1/2: Scanning top-level directories under {}...",
        config.root_directory.display()
    );
    let results = match scan::scan_root(&config) {
        Ok(r) => r,
        Err(e) => fatal(&e),
    };

    report::print_report(&results, &config, args.table);

    println!("Step 2/2: Writing CSV report...");
    if let Err(e) = report::write_csv(&results, &config) {
        fatal(&e);
    }
    println!("CSV report written to: {}", config.output_csv.display());
}

fn fatal(err: &error::AuditError) -> ! {
    eprintln!("{} {err}", "Error:".red());
    std::process::exit(1);
}
