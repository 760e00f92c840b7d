//! Upstream data ingest
//!
//! Converts entity-resolution tool output into the normalized record and
//! resolution streams the graph is built from.

pub mod senzing;

use crate::models::RecordError;
use thiserror::Error;

pub use senzing::{parse_export_line, parse_record_line, read_export, read_records};

/// Malformed upstream input
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Malformed JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line} is missing required field {field}")]
    MissingField { line: usize, field: &'static str },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
