//! Line chart of the two throughput series, written as SVG.

use crate::sampler::ThroughputSeries;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const TITLE: &str = "SQLite WAL Benchmark";
const SIZE: (u32, u32) = (1000, 500);

/// `benchmark_plot <RFC3339 timestamp>.svg` inside `dir`.
pub fn chart_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "benchmark_plot {}.svg",
        at.format("%Y-%m-%dT%H:%M:%S%:z")
    ))
}

/// Draw writes/s and reads/s against elapsed seconds.
pub fn render_chart(series: &ThroughputSeries, path: &Path) -> Result<()> {
    let x_max = (series.len().saturating_sub(1) as u32).max(1);
    let peak = series
        .writes
        .iter()
        .chain(series.reads.iter())
        .copied()
        .max()
        .unwrap_or(0);
    // Headroom above the peak so the top line does not sit on the border.
    let y_max = peak + peak / 10 + 1;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0u32..x_max, 0u64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Operations per second")
        .x_labels(series.len().clamp(2, 20))
        .y_labels(6)
        .x_label_formatter(&|x| format!("{x}s"))
        .draw()?;

    for (label, samples, color) in [
        ("Writes/s", &series.writes, BLUE),
        ("Reads/s", &series.reads, RED),
    ] {
        let points = samples.iter().enumerate().map(|(i, &v)| (i as u32, v));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn chart_file_name_carries_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 6).unwrap();
        let path = chart_path(Path::new("out"), at);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("benchmark_plot 2024-03-09T14:05:06"));
        assert!(name.ends_with(".svg"));
        assert_eq!(path.parent().unwrap(), Path::new("out"));
    }

    #[test]
    fn renders_svg_with_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");
        let series = ThroughputSeries {
            writes: vec![120, 340, 290],
            reads: vec![1_500, 1_420, 1_610],
        };

        render_chart(&series, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Writes/s"));
        assert!(svg.contains("Reads/s"));
    }

    #[test]
    fn renders_single_all_zero_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idle.svg");
        let series = ThroughputSeries {
            writes: vec![0],
            reads: vec![0],
        };
        render_chart(&series, &path).unwrap();
        assert!(path.exists());
    }
}
