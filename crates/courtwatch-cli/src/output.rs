//! Writes normalized slots to stdout or a file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use courtwatch_better::ProcessedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// One pretty-printed JSON array
    Json,
    /// One JSON object per line
    Jsonl,
    /// Fixed-width text table
    Table,
}

/// Opens the sink: the given file (created or truncated) or stdout.
pub(crate) fn open_sink(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

pub(crate) fn write_records<W: Write + ?Sized>(
    writer: &mut W,
    records: &[ProcessedRecord],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for record in records {
                serde_json::to_writer(&mut *writer, record)?;
                writeln!(writer)?;
            }
        }
        OutputFormat::Table => write_table(writer, records)?,
    }
    writer.flush()?;
    Ok(())
}

fn write_table<W: Write + ?Sized>(writer: &mut W, records: &[ProcessedRecord]) -> io::Result<()> {
    writeln!(
        writer,
        "{:<17}  {:>6}  {:>8}  {}",
        "timestamp", "spaces", "duration", "price"
    )?;
    for record in records {
        let timestamp = record
            .timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let spaces = record.spaces().map(|n| n.to_string()).unwrap_or_default();
        let duration = record
            .duration()
            .map(|d| format!("{}min", d.num_minutes()))
            .unwrap_or_default();
        let price = match record.price() {
            Some(Some(amount)) => amount,
            Some(None) => "-",
            None => "",
        };
        writeln!(
            writer,
            "{timestamp:<17}  {spaces:>6}  {duration:>8}  {price}"
        )?;
    }
    Ok(())
}
