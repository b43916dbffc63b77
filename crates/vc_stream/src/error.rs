use std::io;

use thiserror::Error;

use crate::TokenKind;

// -----------------------------------------------------------------------------
// Error

/// Failure while moving a primitive token in or out of a stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    #[error("I/O failure on token stream: {0}")]
    Io(#[from] io::Error),

    #[error("Token stream ended while reading a {0} token")]
    UnexpectedEof(TokenKind),

    #[error("Token mismatch: expected {expected}, found {found}")]
    TokenMismatch {
        expected: TokenKind,
        found: TokenKind,
    },

    #[error("Invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    #[error("String token is not valid UTF-8")]
    InvalidUtf8,

    #[error("String of {0} bytes exceeds the token length limit")]
    StringTooLong(usize),

    #[error("Token stream has already been closed")]
    Closed,
}

impl StreamError {
    /// Returns `true` if the error comes from the underlying device rather
    /// than from the content of the stream.
    #[inline]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Maps an `UnexpectedEof` from [`io::Read::read_exact`] to a typed eof.
    pub(crate) fn from_read(err: io::Error, kind: TokenKind) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof(kind)
        } else {
            Self::Io(err)
        }
    }
}
