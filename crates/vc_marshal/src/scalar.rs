//! Polymorphic scalars and string-keyed maps.
//!
//! A [`Scalar`] is written as an anonymous two-slot array: the `i32` tag of
//! its [`ScalarTag`], then the payload. `Null` carries the payload `0`.
//!
//! String-keyed maps are written as one flat array in the map's own iteration
//! order: `key, value` pairs for string maps and `key, tag, payload` triples
//! for scalar maps.

use alloc::string::String;

use crate::{ErrorKind, Marshaller, Result, StructureError, Unmarshaller};

// -----------------------------------------------------------------------------
// ScalarTag

/// The wire discriminant of a [`Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ScalarTag {
    Null = 0,
    Int = 1,
    Long = 2,
    Float = 3,
    Double = 4,
    Bool = 5,
    Text = 6,
}

impl TryFrom<i32> for ScalarTag {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, i32> {
        Ok(match code {
            0 => Self::Null,
            1 => Self::Int,
            2 => Self::Long,
            3 => Self::Float,
            4 => Self::Double,
            5 => Self::Bool,
            6 => Self::Text,
            other => return Err(other),
        })
    }
}

// -----------------------------------------------------------------------------
// Scalar

/// A primitive value whose kind travels with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Scalar {
    #[default]
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    #[inline]
    pub const fn tag(&self) -> ScalarTag {
        match self {
            Self::Null => ScalarTag::Null,
            Self::Int(_) => ScalarTag::Int,
            Self::Long(_) => ScalarTag::Long,
            Self::Float(_) => ScalarTag::Float,
            Self::Double(_) => ScalarTag::Double,
            Self::Bool(_) => ScalarTag::Bool,
            Self::Text(_) => ScalarTag::Text,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Scalar {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::$variant(value.into())
            }
        }
    )*};
}

impl_from! {
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    String => Text,
    &str => Text,
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// -----------------------------------------------------------------------------
// Single values

fn write_payload(m: &mut dyn Marshaller, value: &Scalar) -> Result<()> {
    m.write_i32(None, value.tag() as i32)?;
    match value {
        Scalar::Null => m.write_i32(None, 0),
        Scalar::Int(v) => m.write_i32(None, *v),
        Scalar::Long(v) => m.write_i64(None, *v),
        Scalar::Float(v) => m.write_f32(None, *v),
        Scalar::Double(v) => m.write_f64(None, *v),
        Scalar::Bool(v) => m.write_bool(None, *v),
        Scalar::Text(v) => m.write_str(None, v),
    }
}

/// Reads the tag, then the payload it selects.
fn read_payload(u: &mut dyn Unmarshaller) -> Result<Scalar> {
    let code = u.read_i32(None)?;
    let tag = ScalarTag::try_from(code).map_err(|code| u.fail(None, ErrorKind::UnknownVariant(code)))?;
    Ok(match tag {
        ScalarTag::Null => {
            u.read_i32(None)?;
            Scalar::Null
        }
        ScalarTag::Int => Scalar::Int(u.read_i32(None)?),
        ScalarTag::Long => Scalar::Long(u.read_i64(None)?),
        ScalarTag::Float => Scalar::Float(u.read_f32(None)?),
        ScalarTag::Double => Scalar::Double(u.read_f64(None)?),
        ScalarTag::Bool => Scalar::Bool(u.read_bool(None)?),
        ScalarTag::Text => Scalar::Text(u.read_string(None)?),
    })
}

/// Writes `value` under `name` as `[tag, payload]`.
pub fn marshal_scalar(m: &mut dyn Marshaller, name: Option<&str>, value: &Scalar) -> Result<()> {
    m.open_array(name, 2)?;
    write_payload(m, value)?;
    m.close_array()
}

/// Reads a `[tag, payload]` pair under `name`.
///
/// An unrecognized tag fails with [`ErrorKind::UnknownVariant`].
pub fn unmarshal_scalar(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<Scalar> {
    u.open_array_exact(name, 2)?;
    let value = read_payload(u)?;
    u.close_array()?;
    Ok(value)
}

// -----------------------------------------------------------------------------
// Maps

fn entries_len(u: &mut dyn Unmarshaller, name: Option<&str>, width: usize) -> Result<usize> {
    let len = u.open_array(name)?;
    if len % width == 0 {
        Ok(len / width)
    } else {
        Err(u.fail(name, StructureError::RaggedEntries { len, width }.into()))
    }
}

/// Writes a string-to-string map as a flat `key, value, ...` array.
pub fn write_string_map<'a, K, V, I>(m: &mut dyn Marshaller, name: Option<&str>, entries: I) -> Result<()>
where
    K: AsRef<str> + ?Sized + 'a,
    V: AsRef<str> + ?Sized + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
    I::IntoIter: ExactSizeIterator,
{
    let entries = entries.into_iter();
    m.open_array(name, entries.len() * 2)?;
    for (key, value) in entries {
        m.write_str(None, key.as_ref())?;
        m.write_str(None, value.as_ref())?;
    }
    m.close_array()
}

/// Reads a map written by [`write_string_map`] into any collection of pairs.
pub fn read_string_map<C>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<C>
where
    C: Default + Extend<(String, String)>,
{
    let count = entries_len(u, name, 2)?;
    let mut out = C::default();
    for _ in 0..count {
        let key = u.read_string(None)?;
        let value = u.read_string(None)?;
        out.extend(Some((key, value)));
    }
    u.close_array()?;
    Ok(out)
}

/// Writes a string-to-scalar map as a flat `key, tag, payload, ...` array.
pub fn write_scalar_map<'a, K, I>(m: &mut dyn Marshaller, name: Option<&str>, entries: I) -> Result<()>
where
    K: AsRef<str> + ?Sized + 'a,
    I: IntoIterator<Item = (&'a K, &'a Scalar)>,
    I::IntoIter: ExactSizeIterator,
{
    let entries = entries.into_iter();
    m.open_array(name, entries.len() * 3)?;
    for (key, value) in entries {
        m.write_str(None, key.as_ref())?;
        write_payload(m, value)?;
    }
    m.close_array()
}

/// Reads a map written by [`write_scalar_map`] into any collection of pairs.
pub fn read_scalar_map<C>(u: &mut dyn Unmarshaller, name: Option<&str>) -> Result<C>
where
    C: Default + Extend<(String, Scalar)>,
{
    let count = entries_len(u, name, 3)?;
    let mut out = C::default();
    for _ in 0..count {
        let key = u.read_string(None)?;
        let value = read_payload(u)?;
        out.extend(Some((key, value)));
    }
    u.close_array()?;
    Ok(out)
}
