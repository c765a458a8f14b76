use anyhow::Result;

use super::{Chart, Metric, Surface};

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const DEFAULT_WIDTH: usize = 60;

/// Plain-terminal surface: sparkline charts, per-country summary cards, and
/// prefixed warning/error lines on the standard streams.
pub struct TermSurface {
    width: usize,
}

impl TermSurface {
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
        }
    }
}

impl Default for TermSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TermSurface {
    fn line_chart(&mut self, chart: &Chart) -> Result<()> {
        println!("{} ({})", chart.title, chart.mode.as_str());
        println!("{}", "=".repeat(self.width + 22));
        for series in &chart.series {
            let values: Vec<i64> = series.points.iter().map(|(_, v)| *v).collect();
            let min = values.iter().min().copied().unwrap_or(0);
            let max = values.iter().max().copied().unwrap_or(0);
            let latest = values.last().copied().unwrap_or(0);

            println!("{:<20}  {}", series.country, sparkline(&values, self.width));
            println!(
                "{:<20}  latest {} {} (min {}, max {})",
                "",
                format_count(latest),
                chart.y_label,
                format_count(min),
                format_count(max),
            );
        }
        println!();
        Ok(())
    }

    fn metric(&mut self, metric: &Metric) -> Result<()> {
        println!("{}", metric.country);
        println!("  Cases: {}", format_count(metric.cases as i64));
        println!("  Deaths: {}", format_count(metric.deaths as i64));
        println!();
        Ok(())
    }

    fn warning(&mut self, message: &str) {
        println!("warning: {}", message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }
}

/// Downsample `values` into at most `width` buckets and map each bucket mean
/// onto a block glyph scaled between the series min and max.
fn sparkline(values: &[i64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let bucket_len = values.len().div_ceil(width);
    let means: Vec<i64> = values
        .chunks(bucket_len)
        .map(|chunk| chunk.iter().sum::<i64>() / chunk.len() as i64)
        .collect();

    let min = means.iter().min().copied().unwrap_or(0);
    let max = means.iter().max().copied().unwrap_or(0);
    let span = (max - min).max(1) as f64;

    means
        .iter()
        .map(|&m| {
            let level = ((m - min) as f64 / span * (BLOCKS.len() - 1) as f64).round() as usize;
            BLOCKS[level.min(BLOCKS.len() - 1)]
        })
        .collect()
}

/// Format with commas (e.g. 12345 → "12,345").
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if n < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}
