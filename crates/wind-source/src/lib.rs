//! Wind Observation Sources
//!
//! The collector side of the pipeline: anything that can hand over a batch of
//! raw observations implements [`ObservationSource`]. Decoding of the station
//! graph feed lives here so the normalizer only ever sees typed observations.

mod error;
mod payload;
mod source;

pub use error::FetchError;
pub use payload::{decode_graph_payload, unwrap_jsonp, GraphPayload};
pub use source::{FileSource, MockSource, ObservationSource, Scenario};
