use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use indexmap::IndexMap;

// -----------------------------------------------------------------------------
// JsonMap

/// An insertion-ordered JSON object.
pub type JsonMap = IndexMap<String, JsonValue>;

// -----------------------------------------------------------------------------
// JsonKind

/// The variant of a [`JsonValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Int,
    Float32,
    Float64,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// Returns `true` for every kind except arrays and objects.
    #[inline]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::Array | Self::Object)
    }

    /// Returns `true` for the three numeric kinds.
    #[inline]
    pub const fn is_number(self) -> bool {
        matches!(self, Self::Int | Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

// -----------------------------------------------------------------------------
// JsonValue

/// A node of an ordered JSON tree.
///
/// Numbers keep the width they were stored with: a value built from an
/// `f32` stays [`JsonValue::Float32`] until it is printed. Text parsing
/// produces [`JsonValue::Int`] for integers that fit an `i64` and
/// [`JsonValue::Float64`] for every other number.
///
/// # Examples
///
/// ```
/// use vc_json::{JsonKind, JsonValue};
///
/// let value = JsonValue::from_str(r#"{"b": 1, "a": [true, 2.5]}"#).unwrap();
///
/// let object = value.as_object().unwrap();
/// assert_eq!(object.keys().collect::<Vec<_>>(), ["b", "a"]);
/// assert_eq!(object["a"].kind(), JsonKind::Array);
/// assert_eq!(value.to_compact_string().unwrap(), r#"{"b":1,"a":[true,2.5]}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(JsonMap),
}

impl JsonValue {
    /// Creates an empty object.
    #[inline]
    pub fn object() -> Self {
        Self::Object(JsonMap::new())
    }

    /// Creates an empty array.
    #[inline]
    pub const fn array() -> Self {
        Self::Array(Vec::new())
    }

    #[inline]
    pub const fn kind(&self) -> JsonKind {
        match self {
            Self::Null => JsonKind::Null,
            Self::Bool(_) => JsonKind::Bool,
            Self::Int(_) => JsonKind::Int,
            Self::Float32(_) => JsonKind::Float32,
            Self::Float64(_) => JsonKind::Float64,
            Self::String(_) => JsonKind::String,
            Self::Array(_) => JsonKind::Array,
            Self::Object(_) => JsonKind::Object,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Any number widened to `f64`.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Vec<JsonValue>> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<JsonValue>> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut JsonMap> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up `key` if this is an object.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Replaces the value with `Null` and returns the old one.
    #[inline]
    pub fn take(&mut self) -> JsonValue {
        core::mem::take(self)
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($ty:ty => $variant:ident) => {
        impl From<$ty> for JsonValue {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::$variant(value.into())
            }
        }
    };
}

impl_from!(bool => Bool);
impl_from!(i32 => Int);
impl_from!(i64 => Int);
impl_from!(f32 => Float32);
impl_from!(f64 => Float64);
impl_from!(String => String);
impl_from!(&str => String);
impl_from!(Vec<JsonValue> => Array);
impl_from!(JsonMap => Object);

impl FromIterator<JsonValue> for JsonValue {
    fn from_iter<I: IntoIterator<Item = JsonValue>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

impl fmt::Display for JsonValue {
    /// Writes the compact text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_compact_string().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
