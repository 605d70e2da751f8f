use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown anomaly code: {0}")]
    UnknownAnomalyCode(u16),

    #[error("malformed anomaly line: {0}")]
    MalformedEntry(String),
}
