//! Turns cumulative counter readings into per-interval throughput.

use crate::counters::CounterSnapshot;

/// Per-interval operation counts. Entry `i` is the number of attempts completed
/// between reading `i` and reading `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThroughputSeries {
    pub writes: Vec<u64>,
    pub reads: Vec<u64>,
}

impl ThroughputSeries {
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn total_writes(&self) -> u64 {
        self.writes.iter().sum()
    }

    pub fn total_reads(&self) -> u64 {
        self.reads.iter().sum()
    }
}

/// Accumulates deltas between consecutive counter readings.
///
/// The reading before the first interval is taken to be zero, so the series
/// always sums to the most recent reading.
#[derive(Debug, Default)]
pub struct Sampler {
    previous: CounterSnapshot,
    series: ThroughputSeries,
}

impl Sampler {
    pub fn with_capacity(intervals: usize) -> Self {
        Self {
            previous: CounterSnapshot::default(),
            series: ThroughputSeries {
                writes: Vec::with_capacity(intervals),
                reads: Vec::with_capacity(intervals),
            },
        }
    }

    /// Append the deltas since the previous reading.
    pub fn record(&mut self, current: CounterSnapshot) {
        self.series
            .writes
            .push(current.writes.saturating_sub(self.previous.writes));
        self.series
            .reads
            .push(current.reads.saturating_sub(self.previous.reads));
        self.previous = current;
    }

    /// The last reading recorded (zero before the first one).
    pub fn last_reading(&self) -> CounterSnapshot {
        self.previous
    }

    pub fn finish(self) -> ThroughputSeries {
        self.series
    }
}

/// Deltas between consecutive cumulative readings: `n` readings give `n - 1`
/// intervals.
pub fn interval_deltas(readings: &[u64]) -> Vec<u64> {
    readings
        .windows(2)
        .map(|w| w[1].saturating_sub(w[0]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(writes: u64, reads: u64) -> CounterSnapshot {
        CounterSnapshot {
            writes,
            reads,
            ..Default::default()
        }
    }

    #[test]
    fn deltas_from_cumulative_readings() {
        assert_eq!(interval_deltas(&[0, 5, 12, 12, 20]), vec![5, 7, 0, 8]);
        assert!(interval_deltas(&[3]).is_empty());
        assert!(interval_deltas(&[]).is_empty());
    }

    #[test]
    fn sampler_matches_interval_deltas() {
        let cumulative = [5u64, 12, 12, 20];
        let mut sampler = Sampler::with_capacity(cumulative.len());
        for &c in &cumulative {
            sampler.record(reading(c, c * 2));
        }

        let series = sampler.finish();
        assert_eq!(series.writes, vec![5, 7, 0, 8]);
        assert_eq!(series.reads, vec![10, 14, 0, 16]);
    }

    #[test]
    fn series_sums_to_last_reading() {
        let mut sampler = Sampler::default();
        for (w, r) in [(3, 1), (10, 1), (10, 9), (41, 30)] {
            sampler.record(reading(w, r));
        }
        let last = sampler.last_reading();
        let series = sampler.finish();

        assert_eq!(series.len(), 4);
        assert_eq!(series.total_writes(), last.writes);
        assert_eq!(series.total_reads(), last.reads);
    }

    #[test]
    fn idle_counters_give_zero_entries() {
        let mut sampler = Sampler::with_capacity(2);
        sampler.record(CounterSnapshot::default());
        sampler.record(CounterSnapshot::default());
        assert_eq!(
            sampler.finish(),
            ThroughputSeries {
                writes: vec![0, 0],
                reads: vec![0, 0],
            }
        );
    }
}
