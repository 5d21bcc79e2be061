//! ASCII line chart of closing prices

use crate::data::PriceSeries;
use std::fmt::Write;

/// Chart heading for a ticker and window length
pub fn chart_title(ticker: &str, months: u32) -> String {
    format!("{ticker} - {months} Month Performance")
}

/// Price line chart drawn with plain characters
///
/// Closes are resampled to at most `width` columns. The top and bottom rows
/// carry the max and min labels; the first and last bar dates sit under the
/// x axis.
#[derive(Debug, Clone, Copy)]
pub struct LineChart {
    width: usize,
    height: usize,
}

impl Default for LineChart {
    fn default() -> Self {
        Self {
            width: 60,
            height: 12,
        }
    }
}

impl LineChart {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(2),
            height: height.max(2),
        }
    }

    /// Render the chart below `title`
    pub fn render(&self, title: &str, series: &PriceSeries) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{title}");

        let closes = series.closes();
        if closes.is_empty() {
            out.push_str("(no data)");
            return out;
        }

        let points = resample(&closes, self.width);
        let min = points.iter().copied().fold(f64::INFINITY, f64::min);
        let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;
        let rows = self.height;

        let level = |v: f64| -> usize {
            if span <= f64::EPSILON {
                rows / 2
            } else {
                (((v - min) / span) * (rows - 1) as f64).round() as usize
            }
        };

        let mut grid = vec![vec![' '; points.len()]; rows];
        let mut previous: Option<usize> = None;
        for (col, value) in points.iter().enumerate() {
            let current = level(*value);
            if let Some(prev) = previous {
                for r in (prev.min(current) + 1)..prev.max(current) {
                    grid[rows - 1 - r][col] = '|';
                }
            }
            grid[rows - 1 - current][col] = '*';
            previous = Some(current);
        }

        let max_label = format!("{max:.2}");
        let min_label = format!("{min:.2}");
        let label_width = max_label.len().max(min_label.len());

        for (i, row) in grid.iter().enumerate() {
            let label = match i {
                0 => max_label.as_str(),
                i if i == rows - 1 => min_label.as_str(),
                _ => "",
            };
            let line: String = row.iter().collect();
            let _ = writeln!(out, "{label:>label_width$} |{}", line.trim_end());
        }
        let _ = writeln!(out, "{:>label_width$} +{}", "", "-".repeat(points.len()));

        if let (Some(first), Some(last)) = (series.first(), series.last()) {
            let first = first.timestamp.format("%Y-%m-%d").to_string();
            let last = last.timestamp.format("%Y-%m-%d").to_string();
            let gap = points.len().saturating_sub(first.len() + last.len()).max(1);
            let _ = write!(
                out,
                "{:indent$}{first}{:gap$}{last}",
                "",
                "",
                indent = label_width + 2
            );
        }

        out
    }
}

/// Evenly spaced samples, keeping the first and last value
fn resample(values: &[f64], width: usize) -> Vec<f64> {
    if values.len() <= width {
        return values.to_vec();
    }
    let last = values.len() - 1;
    (0..width)
        .map(|col| values[col * last / (width - 1)])
        .collect()
}
