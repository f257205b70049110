use thiserror::Error;

use crate::schema::DivisionId;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot build HTTP client: {0}")]
    Client(String),
    #[error("division {0} not found")]
    NotFound(DivisionId),
    #[error("division {division_id}: unexpected HTTP status {status}")]
    Status { division_id: DivisionId, status: u16 },
    #[error("division {division_id}: transport error: {message}")]
    Transport {
        division_id: DivisionId,
        message: String,
    },
    #[error("division {division_id}: response body is not JSON: {message}")]
    Body {
        division_id: DivisionId,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` has the wrong type: {message}")]
    WrongType {
        field: &'static str,
        message: String,
    },
    #[error("invalid timestamp `{value}`")]
    Timestamp { value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("division {0} was already registered")]
    DuplicateDivision(DivisionId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid date `{value}` for `{key}`, expected YYYY-MM-DD")]
    InvalidDate { key: &'static str, value: String },
    #[error("date range is reversed: {start} is after {end}")]
    ReversedDates { start: String, end: String },
    #[error("division range is reversed: {start} is after {end}")]
    ReversedDivisions { start: u32, end: u32 },
    #[error("http timeout must be at least one second")]
    ZeroTimeout,
}
