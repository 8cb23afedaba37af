//! Storage Layer
//!
//! Writes normalized rows in their export shape and reads exported CSV back.

mod reader;
mod sink;

pub use reader::{read_csv_file, read_csv_rows};
pub use sink::{CsvSink, JsonSink, MemorySink, RowSink};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Format error at record {record}: {message}")]
    Format { record: usize, message: String },
}
