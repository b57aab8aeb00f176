//! Error types for building, persisting and querying automatons.

use thiserror::Error;

/// The error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A word is longer than [`MAX_WORD_LEN`](super::MAX_WORD_LEN).
    #[error("word of length {len} exceeds the limit of {max} bytes")]
    WordTooLong {
        /// Length of the rejected word.
        len: usize,
        /// The length limit.
        max: usize,
    },

    /// A word was not strictly greater than the previously added one.
    ///
    /// Contains the previous word and the rejected word, in that order.
    #[error("word {word:?} does not sort after {previous:?}")]
    OutOfOrder {
        /// The last word that was accepted.
        previous: Vec<u8>,
        /// The rejected word.
        word: Vec<u8>,
    },

    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted data is malformed, truncated or out of range.
    #[error("corrupt automaton: {0}")]
    Corrupt(&'static str),

    /// The operation is not valid for this input or automaton kind.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// A `Result` alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps a read failure, treating a premature end of input as corruption.
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::Corrupt("unexpected end of input")
        } else {
            Error::Io(err)
        }
    }
}
