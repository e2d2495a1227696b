//! Error taxonomy for configuration, schema, and coordinate failures.
//!
//! All fallible entry points return `Result<_, Error>`. Nothing here is
//! retried or swallowed: a caller either gets a complete result or an error.

use thiserror::Error;

/// Errors surfaced by the anonymization engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("K must be 1 or greater")]
    InvalidK,

    #[error("min_p must be from 0 to 14")]
    MinPrecisionOutOfRange,

    #[error("max_p must be from 0 to 14")]
    MaxPrecisionOutOfRange,

    #[error("max_p must be greater than or equal to min_p")]
    InvalidPrecisionBounds,

    #[error("break_p must be between min_p and max_p")]
    InvalidBreakPoint,

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("column {0} is not numeric")]
    NonNumericColumn(String),

    #[error("columns must all have the same length, expected {expected} got {got} for column {column}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("malformed combined lat/lon value: {0}")]
    MalformedLatLon(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("row index {0} out of bounds")]
    RowOutOfBounds(usize),
}
