//! Run lifecycle: spawn the workers, sample the counters, stop and join.
//!
//! ```text
//! Spawning ──► Sampling (sleep, read counters) × intervals ──► Draining (stop, join all)
//! ```
//!
//! Workers are scoped threads, so they can borrow the store and counters
//! directly and are guaranteed to be joined before [`run`] returns.

use crate::counters::{CounterSnapshot, OpCounters};
use crate::sampler::{Sampler, ThroughputSeries};
use crate::stop::StopToken;
use crate::store::BenchStore;
use crate::worker::{run_reader, run_writer};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::io;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

/// How much load to generate and how long to watch it.
#[derive(Debug, Clone)]
pub struct Workload {
    pub writers: usize,
    pub readers: usize,
    /// Number of samples taken; also the length of both output series.
    pub intervals: u32,
    /// Sleep between samples. One second for the per-second series.
    pub interval: Duration,
    /// Base seed; each worker derives its own RNG from it.
    pub seed: u64,
}

impl Workload {
    pub fn workers(&self) -> usize {
        self.writers + self.readers
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub series: ThroughputSeries,
    /// Counters at the last sample. The series sums to exactly this.
    pub sampled: CounterSnapshot,
    /// Counters after every worker exited, including the drain tail.
    pub totals: CounterSnapshot,
    /// Wall time spent sampling (drifts slightly above `intervals * interval`).
    pub elapsed: Duration,
    /// Time from raising the stop token until the last worker was joined.
    pub drain: Duration,
    pub panicked_workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Writer,
    Reader,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Writer => f.write_str("writer"),
            Role::Reader => f.write_str("reader"),
        }
    }
}

struct WorkerHandle<'scope> {
    role: Role,
    index: usize,
    handle: ScopedJoinHandle<'scope, u64>,
}

/// Run the benchmark against `store` with fresh counters.
pub fn run<S>(store: &S, workload: &Workload) -> Result<RunOutcome>
where
    S: BenchStore + ?Sized,
{
    let counters = OpCounters::new();
    let stop = StopToken::new();
    run_with(store, workload, &counters, &stop)
}

/// Like [`run`], but with caller-owned counters and stop token.
///
/// The counters should start at zero; the first sample is taken against an
/// implicit zero reading.
pub fn run_with<S>(
    store: &S,
    workload: &Workload,
    counters: &OpCounters,
    stop: &StopToken,
) -> Result<RunOutcome>
where
    S: BenchStore + ?Sized,
{
    thread::scope(|scope| {
        let mut workers = Vec::with_capacity(workload.workers());

        let roles = std::iter::repeat(Role::Writer)
            .take(workload.writers)
            .enumerate()
            .chain(
                std::iter::repeat(Role::Reader)
                    .take(workload.readers)
                    .enumerate(),
            );
        for (index, role) in roles {
            let seed = worker_seed(workload.seed, role, index);
            match spawn_worker(scope, role, index, seed, store, counters, stop) {
                Ok(handle) => workers.push(WorkerHandle {
                    role,
                    index,
                    handle,
                }),
                Err(e) => {
                    drain(stop, workers);
                    return Err(e).with_context(|| format!("failed to spawn {role}-{index}"));
                }
            }
        }
        log::info!(
            "started {} writer(s) and {} reader(s)",
            workload.writers,
            workload.readers
        );

        let mut sampler = Sampler::with_capacity(workload.intervals as usize);
        let started = Instant::now();
        for tick in 1..=workload.intervals {
            thread::sleep(workload.interval);
            let before = sampler.last_reading();
            let now = counters.snapshot();
            sampler.record(now);
            log::info!(
                "t={tick:>3} writes={:>8} reads={:>8}",
                now.writes - before.writes,
                now.reads - before.reads
            );
        }
        let elapsed = started.elapsed();
        let sampled = sampler.last_reading();

        let (drain_time, panicked_workers) = drain(stop, workers);

        Ok(RunOutcome {
            series: sampler.finish(),
            sampled,
            totals: counters.snapshot(),
            elapsed,
            drain: drain_time,
            panicked_workers,
        })
    })
}

fn spawn_worker<'scope, 'env, S>(
    scope: &'scope Scope<'scope, 'env>,
    role: Role,
    index: usize,
    seed: u64,
    store: &'env S,
    counters: &'env OpCounters,
    stop: &'env StopToken,
) -> io::Result<ScopedJoinHandle<'scope, u64>>
where
    S: BenchStore + ?Sized,
{
    let rng = StdRng::seed_from_u64(seed);
    thread::Builder::new()
        .name(format!("{role}-{index}"))
        .spawn_scoped(scope, move || match role {
            Role::Writer => run_writer(store, counters, stop, rng),
            Role::Reader => run_reader(store, counters, stop, rng),
        })
}

/// Raise the stop token and join every worker.
/// Returns how long the join took and how many workers panicked.
fn drain(stop: &StopToken, workers: Vec<WorkerHandle<'_>>) -> (Duration, usize) {
    let started = Instant::now();
    stop.cancel();

    let mut panicked = 0;
    for WorkerHandle {
        role,
        index,
        handle,
    } in workers
    {
        match handle.join() {
            Ok(attempts) => log::debug!("{role}-{index} stopped after {attempts} attempts"),
            Err(_) => {
                panicked += 1;
                log::error!("{role}-{index} panicked");
            }
        }
    }

    let elapsed = started.elapsed();
    log::debug!("drained workers in {elapsed:?}");
    (elapsed, panicked)
}

/// Writers take even offsets from the base seed, readers odd ones.
fn worker_seed(base: u64, role: Role, index: usize) -> u64 {
    let slot = index as u64 * 2
        + match role {
            Role::Writer => 0,
            Role::Reader => 1,
        };
    base.wrapping_add(slot)
}
