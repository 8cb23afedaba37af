//! Wind Observation Model
//!
//! Types that flow between the collector, the normalizer, the classifier and
//! the persistence sinks.

mod raw;
mod row;

pub use raw::{RawObservation, RawValue};
pub use row::{ExportRow, NormalizedRow, RowParseError, EXPORT_HEADER};
