//! Report module: prints the per-second series and a summary of the run.

use crate::config::BenchConfig;
use crate::coordinator::RunOutcome;
use std::fmt::Write;

/// Summary statistics over one per-second series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeriesStats {
    pub total: u64,
    pub mean: f64,
    pub median: f64,
    pub min: u64,
    pub peak: u64,
}

impl SeriesStats {
    pub fn from_samples(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let total: u64 = samples.iter().sum();
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        } else {
            sorted[mid] as f64
        };

        Self {
            total,
            mean: total as f64 / samples.len() as f64,
            median,
            min: sorted[0],
            peak: sorted[sorted.len() - 1],
        }
    }
}

/// Share of `attempts` that failed, in percent.
fn failure_pct(failures: u64, attempts: u64) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    failures as f64 / attempts as f64 * 100.0
}

/// Format the full report. `rows` is the table size after the run, when known.
pub fn render_report(
    config: &BenchConfig,
    journal_mode: &str,
    outcome: &RunOutcome,
    rows: Option<u64>,
) -> String {
    let mut out = String::new();
    let writes = SeriesStats::from_samples(&outcome.series.writes);
    let reads = SeriesStats::from_samples(&outcome.series.reads);
    let totals = &outcome.totals;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "\n{}", "=".repeat(72));
    let _ = writeln!(out, "  SQLite WAL Benchmark Report");
    let _ = writeln!(
        out,
        "  {} writer(s), {} reader(s), {}s on {} (journal_mode={})",
        config.writers, config.readers, config.duration_secs, config.target, journal_mode
    );
    let _ = writeln!(out, "{}", "=".repeat(72));

    let _ = writeln!(out, "\n  Writes per second:\n  {:?}", outcome.series.writes);
    let _ = writeln!(out, "\n  Reads per second:\n  {:?}", outcome.series.reads);

    let _ = writeln!(
        out,
        "\n  {:10} {:>12} {:>10} {:>10} {:>10} {:>10} {:>9}",
        "Op", "Total", "Mean/s", "Median/s", "Min/s", "Peak/s", "Failed"
    );
    let _ = writeln!(out, "  {}", "-".repeat(76));
    for (label, stats, failures, attempts) in [
        ("insert", &writes, totals.write_failures, totals.writes),
        ("lookup", &reads, totals.read_failures, totals.reads),
    ] {
        let _ = writeln!(
            out,
            "  {:10} {:>12} {:>10.1} {:>10.1} {:>10} {:>10} {:>8.2}%",
            label,
            stats.total,
            stats.mean,
            stats.median,
            stats.min,
            stats.peak,
            failure_pct(failures, attempts),
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Sampling wall time: {:>10.3}s",
        outcome.elapsed.as_secs_f64()
    );
    let _ = writeln!(
        out,
        "  Drain time:         {:>10.3}ms",
        outcome.drain.as_secs_f64() * 1000.0
    );
    let _ = writeln!(
        out,
        "  Attempts after last sample: {} insert(s), {} lookup(s)",
        totals.writes.saturating_sub(outcome.sampled.writes),
        totals.reads.saturating_sub(outcome.sampled.reads)
    );
    if let Some(rows) = rows {
        let _ = writeln!(out, "  Rows in table:      {rows:>10}");
    }
    if outcome.panicked_workers > 0 {
        let _ = writeln!(out, "  Panicked workers:   {:>10}", outcome.panicked_workers);
    }
    let _ = writeln!(out, "\n{}", "=".repeat(72));
    out
}

pub fn print_report(
    config: &BenchConfig,
    journal_mode: &str,
    outcome: &RunOutcome,
    rows: Option<u64>,
) {
    println!("{}", render_report(config, journal_mode, outcome, rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CounterSnapshot;
    use crate::sampler::ThroughputSeries;
    use std::time::Duration;

    #[test]
    fn stats_over_odd_and_even_lengths() {
        let odd = SeriesStats::from_samples(&[5, 1, 9]);
        assert_eq!(odd.total, 15);
        assert_eq!(odd.median, 5.0);
        assert_eq!(odd.min, 1);
        assert_eq!(odd.peak, 9);
        assert!((odd.mean - 5.0).abs() < f64::EPSILON);

        let even = SeriesStats::from_samples(&[4, 2, 8, 6]);
        assert_eq!(even.median, 5.0);
        assert_eq!(even.total, 20);
    }

    #[test]
    fn stats_of_empty_series_are_zero() {
        assert_eq!(SeriesStats::from_samples(&[]), SeriesStats::default());
    }

    #[test]
    fn failure_pct_handles_no_attempts() {
        assert_eq!(failure_pct(0, 0), 0.0);
        assert_eq!(failure_pct(1, 4), 25.0);
    }

    #[test]
    fn report_lists_both_series() {
        let outcome = RunOutcome {
            series: ThroughputSeries {
                writes: vec![5, 7, 0, 8],
                reads: vec![0, 0, 0, 0],
            },
            sampled: CounterSnapshot {
                writes: 20,
                ..Default::default()
            },
            totals: CounterSnapshot {
                writes: 22,
                write_failures: 2,
                ..Default::default()
            },
            elapsed: Duration::from_millis(4_003),
            drain: Duration::from_micros(450),
            panicked_workers: 0,
        };

        let text = render_report(&BenchConfig::default(), "wal", &outcome, Some(20));
        assert!(text.contains("[5, 7, 0, 8]"));
        assert!(text.contains("[0, 0, 0, 0]"));
        assert!(text.contains("journal_mode=wal"));
        assert!(text.contains("2 insert(s), 0 lookup(s)"));
        assert!(!text.contains("Panicked"));
    }
}
