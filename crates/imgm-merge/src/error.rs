use std::io;

use imgm_types::SectorIndex;

/// Errors that abort a merge run.
///
/// Unresolved sectors are not errors; they are reported through the
/// anomaly log and the sentinel pattern.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The session invariants do not hold.
    #[error("invalid merge session: {0}")]
    InvalidSession(String),

    /// An input ended before a full sector could be read.
    #[error("short read at sector {sector} from {input}: expected {expected} bytes, got {actual}")]
    ShortRead {
        sector: SectorIndex,
        input: String,
        expected: usize,
        actual: usize,
    },

    /// An input returned an I/O error.
    #[error("read failed at sector {sector} from {input}: {error}")]
    Read {
        sector: SectorIndex,
        input: String,
        #[source]
        error: io::Error,
    },

    /// The merged output rejected a write.
    #[error("write to merged output failed at sector {sector}: {error}")]
    OutputWrite {
        sector: SectorIndex,
        #[source]
        error: io::Error,
    },

    /// The anomaly log rejected a write.
    #[error("write to anomaly log failed at sector {sector}: {error}")]
    LogWrite {
        sector: SectorIndex,
        #[source]
        error: io::Error,
    },

    /// I/O outside the sector loop (flush, config file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The driver already reached `Done`.
    #[error("merge already finished")]
    Finished,
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
