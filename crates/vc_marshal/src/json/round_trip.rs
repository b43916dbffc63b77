use alloc::string::String;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use vc_json::JsonValue;

use super::{JsonFormat, JsonMarshaller, JsonUnmarshaller};
use crate::object::{Marshalable, unmarshal_object};
use crate::{ErrorKind, Marshaller, Result, Unmarshaller};

// -----------------------------------------------------------------------------
// Writing

/// Marshals `value` as the one top-level object of a fresh tree.
pub fn to_json_value<T: Marshalable + ?Sized>(value: &T) -> Result<JsonValue> {
    let mut m = JsonMarshaller::new();
    value.marshal(&mut m, None)?;
    m.check_complete()?;
    m.into_document()
        .ok_or_else(|| ErrorKind::Incomplete { open: 0 }.into())
}

/// Runs `write` against a fresh [`JsonMarshaller`], then the completion
/// check, then renders the tree in `format`.
pub fn to_json_string_with<F>(format: JsonFormat, write: F) -> Result<String>
where
    F: FnOnce(&mut dyn Marshaller) -> Result<()>,
{
    let mut m = JsonMarshaller::new();
    write(&mut m)?;
    m.render(format)
}

/// Compact JSON text of `value`.
#[inline]
pub fn to_json_string<T: Marshalable + ?Sized>(value: &T) -> Result<String> {
    to_json_string_with(JsonFormat::Compact, |m| value.marshal(m, None))
}

/// Indented JSON text of `value`.
#[inline]
pub fn to_formatted_json_string<T: Marshalable + ?Sized>(value: &T) -> Result<String> {
    to_json_string_with(JsonFormat::Pretty, |m| value.marshal(m, None))
}

/// Indented JSON text of `value` with scalar arrays kept on one line.
#[inline]
pub fn to_formatted_compact_json_string<T: Marshalable + ?Sized>(value: &T) -> Result<String> {
    to_json_string_with(JsonFormat::CompactPretty, |m| value.marshal(m, None))
}

/// Writes `value` to the file at `path` in `format`, replacing it.
pub fn to_json_file<T, P>(path: P, value: &T, format: JsonFormat) -> Result<()>
where
    T: Marshalable + ?Sized,
    P: AsRef<Path>,
{
    let text = to_json_string_with(format, |m| value.marshal(m, None))?;
    let mut out = BufWriter::new(fs::File::create(path)?);
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Reading

/// Runs `read` against `u`, then the completion check.
fn finish<T, F>(mut u: JsonUnmarshaller, read: F) -> Result<T>
where
    F: FnOnce(&mut dyn Unmarshaller) -> Result<T>,
{
    let value = read(&mut u)?;
    u.check_complete()?;
    Ok(value)
}

/// Unmarshals a fresh `T` from a tree.
#[inline]
pub fn from_json_value<T: Marshalable + Default>(value: JsonValue) -> Result<T> {
    finish(JsonUnmarshaller::from_value(value), |u| unmarshal_object(u, None))
}

/// Parses `text`, then runs `read` and the completion check.
pub fn from_json_string_with<T, F>(text: &str, read: F) -> Result<T>
where
    F: FnOnce(&mut dyn Unmarshaller) -> Result<T>,
{
    finish(JsonUnmarshaller::from_str(text)?, read)
}

/// Parses `text` and unmarshals a fresh `T` from it.
#[inline]
pub fn from_json_string<T: Marshalable + Default>(text: &str) -> Result<T> {
    from_json_string_with(text, |u| unmarshal_object(u, None))
}

/// Reads the file at `path` and unmarshals a fresh `T` from it.
pub fn from_json_file<T, P>(path: P) -> Result<T>
where
    T: Marshalable + Default,
    P: AsRef<Path>,
{
    let file = fs::File::open(path)?;
    let u = JsonUnmarshaller::from_reader(BufReader::new(file))?;
    finish(u, |u| unmarshal_object(u, None))
}
