//! Row Sinks

use crate::StorageError;
use observation::{ExportRow, NormalizedRow, EXPORT_HEADER};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Destination for a batch of normalized rows
pub trait RowSink {
    /// Write rows, returning how many were written
    fn write_rows(&mut self, rows: &[NormalizedRow]) -> Result<usize, StorageError>;
}

/// CSV with the `time,windSpeed,windGust,windDirection` header
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl CsvSink<BufWriter<File>> {
    /// Create (or truncate) a CSV file
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        info!("Writing CSV rows to {}", path.display());
        Ok(Self::from_writer(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(writer),
            header_written: false,
        }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, StorageError> {
        self.writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_rows(&mut self, rows: &[NormalizedRow]) -> Result<usize, StorageError> {
        if !self.header_written {
            self.writer.write_record(EXPORT_HEADER)?;
            self.header_written = true;
        }

        for row in rows {
            self.writer.serialize(ExportRow::from(row))?;
        }
        self.writer.flush()?;

        debug!("Wrote {} CSV rows", rows.len());
        Ok(rows.len())
    }
}

/// Pretty-printed JSON array of export rows, one batch per sink
pub struct JsonSink<W: Write> {
    writer: W,
}

impl JsonSink<BufWriter<File>> {
    /// Create (or truncate) a JSON file
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        info!("Writing JSON rows to {}", path.display());
        Ok(Self::from_writer(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonSink<W> {
    /// Wrap any writer
    pub fn from_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RowSink for JsonSink<W> {
    fn write_rows(&mut self, rows: &[NormalizedRow]) -> Result<usize, StorageError> {
        let export: Vec<ExportRow> = rows.iter().map(ExportRow::from).collect();
        serde_json::to_writer_pretty(&mut self.writer, &export)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        debug!("Wrote {} JSON rows", rows.len());
        Ok(rows.len())
    }
}

/// In-memory sink with a retention cap (oldest rows dropped first)
pub struct MemorySink {
    rows: VecDeque<NormalizedRow>,
    max_rows: usize,
}

impl MemorySink {
    /// Create a sink keeping at most `max_rows` rows
    pub fn new(max_rows: usize) -> Self {
        Self {
            rows: VecDeque::with_capacity(max_rows.min(1024)),
            max_rows,
        }
    }

    /// Stored rows, oldest first
    pub fn rows(&self) -> Vec<NormalizedRow> {
        self.rows.iter().cloned().collect()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop all stored rows
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        // A week of 5-minute samples
        Self::new(7 * 24 * 12)
    }
}

impl RowSink for MemorySink {
    fn write_rows(&mut self, rows: &[NormalizedRow]) -> Result<usize, StorageError> {
        for row in rows {
            while self.rows.len() >= self.max_rows && !self.rows.is_empty() {
                self.rows.pop_front();
            }
            if self.max_rows > 0 {
                self.rows.push_back(row.clone());
            }
        }
        Ok(rows.len())
    }
}
