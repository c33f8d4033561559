//! CSV export for chart history series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::SecondsFormat;

use crate::sim::history::HistoryPoint;

/// Column header for history export.
const HEADER: &str = "timestamp,power_mw,co2_impact_kg_per_h";

/// Exports a history series to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(points: &[HistoryPoint], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(points, buf)
}

/// Writes a history series as CSV to any writer.
///
/// Timestamps are RFC 3339 in UTC with millisecond precision; values carry
/// four decimals. Output is deterministic for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(points: &[HistoryPoint], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for p in points {
        wtr.write_record(&[
            p.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            format!("{:.4}", p.power_mw),
            format!("{:.4}", p.co2_impact_kg_per_h),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
