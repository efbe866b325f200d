//! Command-line flags and the validated benchmark configuration.
//!
//! Every flag can also come from the environment (`WALBENCH_*`), and a `.env`
//! file in the working directory is loaded before parsing.

use crate::coordinator::Workload;
use crate::store::StorageTarget;
use anyhow::{bail, Result};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "database.db";

/// Sampling period of the throughput series.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug, Clone)]
#[command(name = "wal-bench")]
#[command(version, about = "Concurrent insert/lookup throughput of one SQLite file in WAL mode")]
pub struct Args {
    /// Number of writer threads
    #[arg(long, env = "WALBENCH_WRITERS", default_value_t = 2)]
    pub writers: usize,

    /// Number of reader threads
    #[arg(long, env = "WALBENCH_READERS", default_value_t = 10)]
    pub readers: usize,

    /// Benchmark duration in seconds (one sample per second)
    #[arg(
        long,
        env = "WALBENCH_DURATION",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub duration: u32,

    /// Database file
    #[arg(long, env = "WALBENCH_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Use an in-memory database (single shared connection, ignores --db)
    #[arg(long, env = "WALBENCH_MEMORY")]
    pub memory: bool,

    /// How long SQLite retries a locked database before failing the operation
    #[arg(long, env = "WALBENCH_BUSY_TIMEOUT_MS", default_value_t = 5_000)]
    pub busy_timeout_ms: u64,

    /// Base seed for the worker RNGs (random when omitted)
    #[arg(long, env = "WALBENCH_SEED")]
    pub seed: Option<u64>,

    /// Directory the chart is written to
    #[arg(long, env = "WALBENCH_CHART_DIR", default_value = ".")]
    pub chart_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long)]
    pub no_chart: bool,

    /// Console log level (error, warn, info, debug, trace)
    #[arg(long, env = "WALBENCH_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,

    /// Also write logs to this file (captures debug output)
    #[arg(long, env = "WALBENCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Validated settings for one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub writers: usize,
    pub readers: usize,
    pub duration_secs: u32,
    pub target: StorageTarget,
    pub busy_timeout: Duration,
    pub seed: u64,
    /// `None` disables the chart.
    pub chart_dir: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            writers: 2,
            readers: 10,
            duration_secs: 10,
            target: StorageTarget::File(PathBuf::from(DEFAULT_DB_PATH)),
            busy_timeout: Duration::from_millis(5_000),
            seed: 0,
            chart_dir: Some(PathBuf::from(".")),
        }
    }
}

impl BenchConfig {
    /// Reject settings the coordinator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.duration_secs == 0 {
            bail!("duration must be at least 1 second");
        }
        if let StorageTarget::File(path) = &self.target {
            if path.as_os_str().is_empty() {
                bail!("database path must not be empty");
            }
            if path.is_dir() {
                bail!("database path {} is a directory", path.display());
            }
        }
        Ok(())
    }

    pub fn workers(&self) -> usize {
        self.writers + self.readers
    }

    /// Load description for the coordinator, sampling once per second.
    pub fn workload(&self) -> Workload {
        Workload {
            writers: self.writers,
            readers: self.readers,
            intervals: self.duration_secs,
            interval: SAMPLE_INTERVAL,
            seed: self.seed,
        }
    }
}

impl TryFrom<Args> for BenchConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        let target = if args.memory {
            StorageTarget::Memory
        } else {
            StorageTarget::File(args.db)
        };
        let config = BenchConfig {
            writers: args.writers,
            readers: args.readers,
            duration_secs: args.duration,
            target,
            busy_timeout: Duration::from_millis(args.busy_timeout_ms),
            seed: args.seed.unwrap_or_else(rand::random),
            chart_dir: (!args.no_chart).then_some(args.chart_dir),
        };
        config.validate()?;
        Ok(config)
    }
}
