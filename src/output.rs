//! Terminal output for aggregates and the largest-events table.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::aggregate::{Dashboard, LargestRow};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

// Magnitude-based colors
const RED: &str = "\x1b[91m"; // mag >= 7.0
const YELLOW: &str = "\x1b[93m"; // mag >= 6.0
const CYAN: &str = "\x1b[96m"; // mag >= 4.5
const GREEN: &str = "\x1b[92m"; // mag >= 3.0
const WHITE: &str = "\x1b[97m"; // mag < 3.0

/// Widest bar drawn by the human histogram.
const BAR_WIDTH: usize = 40;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON document
    Json,
    /// Newline-delimited JSON (one row per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Get the color code for a magnitude value.
fn magnitude_color(mag: f64) -> &'static str {
    match mag {
        m if m >= 7.0 => RED,
        m if m >= 6.0 => YELLOW,
        m if m >= 4.5 => CYAN,
        m if m >= 3.0 => GREEN,
        _ => WHITE,
    }
}

fn to_io<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// A bar of `count` scaled against `max`.
fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(len)
}

fn write_section<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    writeln!(writer, "\n{BOLD}{title}{RESET}")?;
    writeln!(writer, "{DIM}{}{RESET}", "─".repeat(60))
}

/// Write the dashboard aggregates for a terminal.
///
/// Per-event series are summarized by their length; grouped series are
/// printed in full.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_dashboard_human<W: Write>(writer: &mut W, dashboard: &Dashboard) -> io::Result<()> {
    if dashboard.magnitude_over_time.is_empty() {
        writeln!(writer, "No earthquake data available.")?;
        return Ok(());
    }

    write_section(writer, "Frequency vs Magnitude")?;
    let max = dashboard
        .magnitude_frequency
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    for row in &dashboard.magnitude_frequency {
        #[allow(clippy::cast_precision_loss)]
        let color = magnitude_color(row.bucket as f64);
        writeln!(
            writer,
            "  {color}M{:<3}{RESET} {:>5}  {color}{}{RESET}",
            row.bucket,
            row.count,
            bar(row.count, max)
        )?;
    }

    write_section(writer, "Average Magnitude vs Region")?;
    for row in &dashboard.average_magnitude_by_region {
        let color = magnitude_color(row.avg_magnitude);
        writeln!(writer, "  {:<40} {color}{:>6.2}{RESET}", row.region, row.avg_magnitude)?;
    }

    write_section(writer, "Geographical Distribution")?;
    let max = dashboard.count_by_region.iter().map(|r| r.count).max().unwrap_or(0);
    for row in &dashboard.count_by_region {
        writeln!(
            writer,
            "  {:<40} {:>5}  {DIM}{}{RESET}",
            row.region,
            row.count,
            bar(row.count, max)
        )?;
    }

    write_section(writer, "Per-event series")?;
    writeln!(
        writer,
        "  magnitude/time: {}  depth/magnitude: {}  depth/region: {}",
        dashboard.magnitude_over_time.len(),
        dashboard.depth_vs_magnitude.len(),
        dashboard.depth_by_region.len()
    )?;

    if !dashboard.largest.is_empty() {
        write_section(writer, "20 Largest Earthquakes Since 1900")?;
        write_largest_human(writer, &dashboard.largest)?;
    }
    Ok(())
}

/// Write the largest-events table for a terminal.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_largest_human<W: Write>(writer: &mut W, rows: &[LargestRow]) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(writer, "No data available.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "  {DIM}{:<10} │ {:>4} │ {:>7} │ Location{RESET}",
        "Date", "Mag", "Depth"
    )?;
    for row in rows {
        let color = magnitude_color(row.magnitude);
        writeln!(
            writer,
            "  {:<10} │ {color}{BOLD}{:>4.1}{RESET} │ {:>5.1}km │ {}",
            row.date,
            row.magnitude,
            row.depth,
            row.place.as_deref().unwrap_or("Unknown location")
        )?;
    }
    Ok(())
}

/// Write any serializable value as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(to_io)?;
    writeln!(writer, "{json}")
}

/// Write each item as one line of JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write, T: Serialize>(writer: &mut W, items: &[T]) -> io::Result<()> {
    for item in items {
        let json = serde_json::to_string(item).map_err(to_io)?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write the dashboard in the specified format.
///
/// NDJSON emits one line per series, tagged with the series name.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_dashboard<W: Write>(writer: &mut W, dashboard: &Dashboard, format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_dashboard_human(writer, dashboard),
        Format::Json => write_json(writer, dashboard),
        Format::Ndjson => {
            let value = serde_json::to_value(dashboard).map_err(to_io)?;
            let lines: Vec<serde_json::Value> = value
                .as_object()
                .into_iter()
                .flatten()
                .map(|(series, rows)| serde_json::json!({ "series": series, "rows": rows }))
                .collect();
            write_ndjson(writer, &lines)
        }
    }
}

/// Write the largest-events table in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_largest<W: Write>(writer: &mut W, rows: &[LargestRow], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_largest_human(writer, rows),
        Format::Json => write_json(writer, rows),
        Format::Ndjson => write_ndjson(writer, rows),
    }
}
