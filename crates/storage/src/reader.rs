//! Reading Exported Rows Back

use crate::StorageError;
use observation::{ExportRow, NormalizedRow, EXPORT_HEADER};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Read exported CSV rows from any reader
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<NormalizedRow>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.iter().ne(EXPORT_HEADER.iter().copied()) {
        return Err(StorageError::Format {
            record: 0,
            message: format!(
                "expected header {:?}, found {:?}",
                EXPORT_HEADER,
                headers.iter().collect::<Vec<_>>()
            ),
        });
    }

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<ExportRow>().enumerate() {
        let export = record?;
        let row = NormalizedRow::try_from(&export).map_err(|e| StorageError::Format {
            record: i + 1,
            message: e.to_string(),
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Read an exported CSV file
pub fn read_csv_file(path: impl AsRef<Path>) -> Result<Vec<NormalizedRow>, StorageError> {
    let path = path.as_ref();
    let rows = read_csv_rows(File::open(path)?)?;
    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
