//! Command-line runner: opens the database, runs the workers for the configured
//! duration, prints the per-second series and writes a chart.
//!
//! Usage:
//!   cargo run --release -p wal-bench
//!   cargo run --release -p wal-bench -- --writers 4 --readers 16 --duration 30
//!   cargo run --release -p wal-bench -- --memory     # single shared connection

use anyhow::{Context, Result};
use bench_core::{initialize_logger, LogSettings};
use clap::Parser;
use std::process;
use wal_bench::chart::{chart_path, render_chart};
use wal_bench::config::{Args, BenchConfig};
use wal_bench::coordinator;
use wal_bench::report::print_report;
use wal_bench::store::SqliteStore;

fn main() {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut log_settings = LogSettings::stderr(args.log_level);
    if let Some(path) = &args.log_file {
        log_settings = log_settings.with_file(path);
    }
    if let Err(e) = initialize_logger(&log_settings) {
        eprintln!("Failed to initialize logger: {e:#}. Exiting.");
        process::exit(1);
    }

    let config = match BenchConfig::try_from(args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        log::error!("{e:#}");
        process::exit(1);
    }
}

fn run(config: &BenchConfig) -> Result<()> {
    println!("Starting benchmark with");
    println!("  {} writer(s)", config.writers);
    println!("  {} reader(s)", config.readers);
    println!("  {} second(s)", config.duration_secs);
    println!("  on {}", config.target);
    println!("  seed {}", config.seed);

    let store = SqliteStore::open(config.target.clone(), config.workers(), config.busy_timeout)
        .context("failed to open storage")?;
    store.init_schema()?;
    log::info!(
        "storage ready: {} connection(s), journal_mode={}",
        store.pool_size(),
        store.journal_mode()
    );

    let outcome = coordinator::run(&store, &config.workload())?;

    let rows = match store.row_count() {
        Ok(rows) => Some(rows),
        Err(e) => {
            log::warn!("could not count rows: {e:#}");
            None
        }
    };
    print_report(config, store.journal_mode(), &outcome, rows);

    if let Some(dir) = &config.chart_dir {
        let path = chart_path(dir, chrono::Local::now());
        // The numbers are already on stdout; a failed chart is not a failed run.
        match render_chart(&outcome.series, &path) {
            Ok(()) => println!("Chart written to {}", path.display()),
            Err(e) => log::error!("Error saving chart: {e:#}"),
        }
    }

    Ok(())
}
