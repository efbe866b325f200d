//! Writer and reader loops.
//!
//! A worker is one OS thread running one of these loops until the coordinator
//! raises the stop token. Each iteration is a single synchronous store call; the
//! token is checked before every call, never during one.

use crate::counters::OpCounters;
use crate::stop::StopToken;
use crate::store::BenchStore;
use anyhow::Result;
use rand::Rng;
use std::ops::RangeInclusive;

/// Keys written and looked up are drawn uniformly from this range.
pub const USER_ID_RANGE: RangeInclusive<u32> = 1..=1000;

/// Inserted amounts are uniform in `[0, MAX_AMOUNT)`.
pub const MAX_AMOUNT: f64 = 100.0;

/// Row cap for a single lookup.
pub const LOOKUP_LIMIT: u32 = 10;

/// One insert with a random key and amount.
pub fn write_once<S, R>(store: &S, rng: &mut R) -> Result<()>
where
    S: BenchStore + ?Sized,
    R: Rng,
{
    let user_id = rng.gen_range(USER_ID_RANGE);
    let amount = rng.gen_range(0.0..MAX_AMOUNT);
    store.insert(user_id, amount)
}

/// One bounded lookup for a random key. Returns the rows drained.
pub fn read_once<S, R>(store: &S, rng: &mut R) -> Result<usize>
where
    S: BenchStore + ?Sized,
    R: Rng,
{
    let user_id = rng.gen_range(USER_ID_RANGE);
    store.lookup(user_id, LOOKUP_LIMIT)
}

/// Insert until `stop` is raised. Returns the number of attempts made.
///
/// Failed inserts are logged and counted like successful ones; the next
/// iteration is the retry.
pub fn run_writer<S, R>(store: &S, counters: &OpCounters, stop: &StopToken, mut rng: R) -> u64
where
    S: BenchStore + ?Sized,
    R: Rng,
{
    let mut attempts = 0;
    while !stop.is_cancelled() {
        match write_once(store, &mut rng) {
            Ok(()) => counters.record_write(true),
            Err(e) => {
                log::warn!("insert failed: {e:#}");
                counters.record_write(false);
            }
        }
        attempts += 1;
    }
    attempts
}

/// Look up until `stop` is raised. Returns the number of attempts made.
pub fn run_reader<S, R>(store: &S, counters: &OpCounters, stop: &StopToken, mut rng: R) -> u64
where
    S: BenchStore + ?Sized,
    R: Rng,
{
    let mut attempts = 0;
    while !stop.is_cancelled() {
        match read_once(store, &mut rng) {
            Ok(_rows) => counters.record_read(true),
            Err(e) => {
                // Data is not being verified, so a failed lookup is just noise.
                log::debug!("lookup failed: {e:#}");
                counters.record_read(false);
            }
        }
        attempts += 1;
    }
    attempts
}
