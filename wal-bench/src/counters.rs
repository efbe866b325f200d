//! Operation counters shared by the workers and the sampler.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative attempt counts, plus how many of those attempts failed.
///
/// `writes` and `reads` count every attempt, failed or not; that is the
/// throughput figure. The failure counters are a subset of them and only exist so
/// the report can say how much of the throughput was failed work.
#[derive(Debug, Default)]
pub struct OpCounters {
    writes: AtomicU64,
    reads: AtomicU64,
    write_failures: AtomicU64,
    read_failures: AtomicU64,
}

/// Point-in-time copy of [`OpCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub writes: u64,
    pub reads: u64,
    pub write_failures: u64,
    pub read_failures: u64,
}

impl OpCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one write attempt.
    pub fn record_write(&self, ok: bool) {
        if !ok {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one read attempt.
    pub fn record_read(&self, ok: bool) {
        if !ok {
            self.read_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            writes: self.writes(),
            reads: self.reads(),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
        }
    }
}
