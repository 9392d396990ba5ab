//! Rejection reasons for RTTFC input.

use thiserror::Error;

/// Why a datagram could not be converted.
///
/// All variants are per-record: the record is dropped and processing
/// continues with the next datagram.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The datagram is not valid UTF-8 text.
    #[error("Datagram is not valid UTF-8 text")]
    InvalidEncoding,

    /// Fewer CSV fields than the RTTFC minimum.
    #[error("Too few CSV fields: {count} (need at least {min})")]
    TooFewFields { count: usize, min: usize },

    /// First field is not `RTTFC`.
    #[error("Not RTTFC: record type '{0}'")]
    WrongRecordType(String),

    /// A numeric field holds text that does not parse.
    #[error("Malformed {name} (field {index}): '{value}'")]
    FieldFormat {
        index: usize,
        name: &'static str,
        value: String,
    },
}
