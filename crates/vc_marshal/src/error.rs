use alloc::string::String;
use alloc::vec::Vec;
use core::{error, fmt};
use std::io;

use thiserror::Error;
use vc_json::JsonKind;
use vc_stream::StreamError;

use crate::ContextKind;

/// Result type of every marshal and unmarshal operation.
pub type Result<T, E = MarshalError> = core::result::Result<T, E>;

// -----------------------------------------------------------------------------
// StructureError

/// A violation of the nesting rules of maps, arrays and the root.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StructureError {
    #[error("cannot close {expected}: the innermost open context is {found}")]
    MismatchedClose {
        expected: ContextKind,
        found: ContextKind,
    },

    #[error("array declared with {declared} elements holds {actual}")]
    ArrayLength { declared: usize, actual: usize },

    #[error("array declared with {declared} elements has no room for another")]
    ArrayOverrun { declared: usize },

    #[error("name `{0}` is already used in this map")]
    DuplicateName(String),

    #[error("a map entry needs a name")]
    MissingName,

    #[error("array elements are anonymous, got name `{0}`")]
    UnexpectedName(String),

    #[error("a scalar cannot be placed directly under the root")]
    ScalarAtRoot,

    #[error("top-level contexts are anonymous, got name `{0}`")]
    NamedRoot(String),

    #[error("this backend holds a single top-level object and it has been used")]
    RootExhausted,

    #[error("map has no key `{0}`")]
    MissingKey(String),

    #[error("map has keys that were never read: {0:?}")]
    UnconsumedKeys(Vec<String>),

    #[error("array length token is negative: {0}")]
    NegativeLength(i32),

    #[error("flat entry array of length {len} is not a multiple of {width}")]
    RaggedEntries { len: usize, width: usize },
}

// -----------------------------------------------------------------------------
// ErrorKind

/// What went wrong, without the location.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: JsonKind,
    },

    #[error("value {value} is outside [{min}, {max}]")]
    Range { value: i64, min: i64, max: i64 },

    #[error("name token mismatch: expected `{expected}`, found `{found}`")]
    NameMismatch { expected: String, found: String },

    #[error("unknown variant tag {0}")]
    UnknownVariant(i32),

    #[error("completion check with {open} context(s) still open")]
    Incomplete { open: usize },

    #[error("could not create an instance of `{type_name}`")]
    Allocation { type_name: &'static str },

    #[error("string field holds null")]
    NullString,

    #[error("non-finite number {0} has no JSON form")]
    NonFinite(f64),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] vc_json::Error),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    #[error("backend has been closed")]
    Closed,
}

/// Who is to blame for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Calls were made in an order the protocol forbids.
    Programmer,
    /// The document does not match the schema being walked.
    Data,
    /// The underlying device failed.
    Io,
}

impl ErrorKind {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Structure(e) => match e {
                StructureError::MismatchedClose { .. }
                | StructureError::MissingName
                | StructureError::UnexpectedName(_)
                | StructureError::ScalarAtRoot
                | StructureError::NamedRoot(_)
                | StructureError::RootExhausted => ErrorClass::Programmer,
                StructureError::ArrayLength { .. }
                | StructureError::ArrayOverrun { .. }
                | StructureError::DuplicateName(_)
                | StructureError::MissingKey(_)
                | StructureError::UnconsumedKeys(_)
                | StructureError::NegativeLength(_)
                | StructureError::RaggedEntries { .. } => ErrorClass::Data,
            },
            Self::Incomplete { .. } | Self::Closed => ErrorClass::Programmer,
            Self::Io(_) => ErrorClass::Io,
            Self::Stream(e) if e.is_io() => ErrorClass::Io,
            Self::Stream(_)
            | Self::Type { .. }
            | Self::Range { .. }
            | Self::NameMismatch { .. }
            | Self::UnknownVariant(_)
            | Self::Allocation { .. }
            | Self::NullString
            | Self::NonFinite(_)
            | Self::InvalidJson(_) => ErrorClass::Data,
        }
    }
}

// -----------------------------------------------------------------------------
// MarshalError

/// An [`ErrorKind`] together with the context path where it was raised,
/// such as `root.shapes[2].radius`.
///
/// With the `debug` feature disabled the path holds only its last segment.
#[derive(Debug)]
pub struct MarshalError {
    kind: ErrorKind,
    path: String,
}

impl MarshalError {
    #[inline]
    pub fn new(kind: impl Into<ErrorKind>, path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: path.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[inline]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Where the error was raised; empty when no context stack was involved.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    #[inline]
    pub fn is_programmer_error(&self) -> bool {
        self.class() == ErrorClass::Programmer
    }

    #[inline]
    pub fn is_data_error(&self) -> bool {
        self.class() == ErrorClass::Data
    }

    /// Shortcut for matching on the structural cause.
    #[inline]
    pub fn structure(&self) -> Option<&StructureError> {
        match &self.kind {
            ErrorKind::Structure(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} (at `{}`)", self.kind, self.path)
        }
    }
}

impl error::Error for MarshalError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::InvalidJson(e) => Some(e),
            ErrorKind::Stream(e) => Some(e),
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ErrorKind> for MarshalError {
    /// Wraps a kind raised outside of any context.
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: String::new(),
        }
    }
}

impl From<io::Error> for MarshalError {
    #[inline]
    fn from(value: io::Error) -> Self {
        ErrorKind::Io(value).into()
    }
}
