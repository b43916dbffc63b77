//! The tree-backed JSON backend.
//!
//! [`JsonMarshaller`] builds an ordered [`JsonValue`] tree and
//! [`JsonUnmarshaller`] walks one. Both hold exactly one top-level object.
//! The `*_json_*` functions wrap a whole pass over one [`Marshalable`] value.
//!
//! [`Marshalable`]: crate::object::Marshalable

use core::fmt;

use vc_json::JsonValue;

mod reader;
mod round_trip;
mod writer;

pub use reader::JsonUnmarshaller;
pub use round_trip::{
    from_json_file, from_json_string, from_json_string_with, from_json_value, to_formatted_compact_json_string,
    to_formatted_json_string, to_json_file, to_json_string, to_json_string_with, to_json_value,
};
pub use writer::JsonMarshaller;

// -----------------------------------------------------------------------------
// Options

/// What closing a map does with keys that were never read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Unread keys are an error.
    #[default]
    Strict,
    /// Unread keys are returned to the caller and otherwise ignored.
    Lenient,
}

/// Text layout of a rendered document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum JsonFormat {
    /// No structural whitespace.
    #[default]
    Compact,
    /// Two-space indentation, one element per line.
    Pretty,
    /// Like `Pretty`, but arrays holding only scalars stay on one line.
    CompactPretty,
}

// -----------------------------------------------------------------------------
// ValueKind

/// The kind of the next value, as reported by
/// [`JsonUnmarshaller::peek_kind`].
///
/// Integers are `Int32` when they fit an `i32`. Floats keep the width the
/// tree node was stored with; numbers parsed from text are always `Float64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
    Map,
    Array,
}

impl ValueKind {
    pub fn of(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(_) => Self::Bool,
            JsonValue::Int(v) if i32::try_from(*v).is_ok() => Self::Int32,
            JsonValue::Int(_) => Self::Int64,
            JsonValue::Float32(_) => Self::Float32,
            JsonValue::Float64(_) => Self::Float64,
            JsonValue::String(_) => Self::String,
            JsonValue::Array(_) => Self::Array,
            JsonValue::Object(_) => Self::Map,
        }
    }

    #[inline]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Map | Self::Array)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "boolean",
            Self::String => "string",
            Self::Map => "map",
            Self::Array => "array",
        })
    }
}
