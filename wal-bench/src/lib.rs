//! SQLite WAL Throughput Benchmark
//!
//! Measures how many inserts and point lookups per second a single SQLite file in
//! WAL mode sustains while N writer threads and M reader threads hammer it at the
//! same time.
//!
//! The pieces, leaves first:
//! - [`store`]: the shared storage handle (connection pool over one database)
//! - [`schema`]: connection pragmas and the `expenses` table
//! - [`counters`] / [`stop`]: the atomics shared between workers and coordinator
//! - [`worker`]: writer and reader loops
//! - [`sampler`] / [`coordinator`]: per-second sampling and the run lifecycle
//! - [`config`], [`report`], [`chart`]: CLI plumbing and output
//!
//! Run the benchmark: `cargo run --release -p wal-bench -- --writers 4 --readers 8`
//! Run tests: `cargo test -p wal-bench`

pub mod chart;
pub mod config;
pub mod coordinator;
pub mod counters;
pub mod report;
pub mod sampler;
pub mod schema;
pub mod stop;
pub mod store;
pub mod worker;
