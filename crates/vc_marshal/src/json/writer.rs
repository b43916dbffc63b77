use alloc::string::String;
use alloc::vec::Vec;

use vc_json::{JsonMap, JsonValue};

use super::JsonFormat;
use crate::context::ContextStack;
use crate::{ErrorKind, MarshalError, Marshaller, Result};

// -----------------------------------------------------------------------------
// JsonMarshaller

/// A [`Marshaller`] building an ordered JSON tree.
///
/// Maps become objects with keys in write order, arrays become arrays. One
/// top-level object (or array) may be written per instance; the finished
/// tree is taken with [`into_document`](Self::into_document) or rendered with
/// [`render`](Self::render).
///
/// Besides the primitive contract it can splice pre-serialized JSON
/// ([`write_raw_json`](Self::write_raw_json)) and explicit nulls.
pub struct JsonMarshaller {
    stack: ContextStack<JsonValue>,
    document: Option<JsonValue>,
}

impl Default for JsonMarshaller {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl JsonMarshaller {
    #[inline]
    pub const fn new() -> Self {
        Self {
            stack: ContextStack::single(),
            document: None,
        }
    }

    /// The finished document, once the top-level context has closed.
    #[inline]
    pub fn document(&self) -> Option<&JsonValue> {
        self.document.as_ref()
    }

    #[inline]
    pub fn into_document(self) -> Option<JsonValue> {
        self.document
    }

    /// Runs the completion check and renders the document as text.
    pub fn render(&mut self, format: JsonFormat) -> Result<String> {
        self.stack.check_complete()?;
        let Some(document) = &self.document else {
            return Err(self.stack.fail(None, ErrorKind::Incomplete { open: 0 }));
        };
        let text = match format {
            JsonFormat::Compact => document.to_compact_string(),
            JsonFormat::Pretty => document.to_pretty_string(),
            JsonFormat::CompactPretty => document.to_compact_pretty_string(),
        };
        text.map_err(|e| self.stack.fail(None, e))
    }

    /// [`render`](Self::render) in [`JsonFormat::Compact`].
    #[inline]
    pub fn to_compact_string(&mut self) -> Result<String> {
        self.render(JsonFormat::Compact)
    }

    /// [`render`](Self::render) in [`JsonFormat::Pretty`].
    #[inline]
    pub fn to_pretty_string(&mut self) -> Result<String> {
        self.render(JsonFormat::Pretty)
    }

    /// Writes a JSON `null` under `name`.
    pub fn write_null(&mut self, name: Option<&str>) -> Result<()> {
        self.put(name, JsonValue::Null)
    }

    /// Writes an already-built subtree under `name`.
    pub fn write_value(&mut self, name: Option<&str>, value: JsonValue) -> Result<()> {
        self.put(name, value)
    }

    /// Splices a serialized JSON object or array under `name` as a real
    /// subtree. The empty string writes `null`.
    pub fn write_raw_json(&mut self, name: Option<&str>, text: &str) -> Result<()> {
        let value = if text.is_empty() {
            JsonValue::Null
        } else {
            let value = JsonValue::from_str(text).map_err(|e| self.stack.fail(name, e))?;
            if value.kind().is_scalar() {
                return Err(self.stack.fail(name, ErrorKind::Type {
                    expected: "object or array",
                    found: value.kind(),
                }));
            }
            value
        };
        log::debug!("splicing raw {} at {}", value.kind(), self.stack.location(name));
        self.put(name, value)
    }

    fn finite(&self, name: Option<&str>, value: f64) -> Result<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(self.stack.fail(name, ErrorKind::NonFinite(value)))
        }
    }

    /// Validates `name` and stores `value` in the innermost container.
    fn put(&mut self, name: Option<&str>, value: JsonValue) -> Result<()> {
        self.stack.visit_scalar(name)?;
        self.attach(name.map(String::from), value);
        Ok(())
    }

    /// Stores a value or a closed child in the innermost open container, or
    /// makes it the document when none is open.
    fn attach(&mut self, key: Option<String>, value: JsonValue) {
        match self.stack.top_mut().map(|frame| &mut frame.payload) {
            Some(JsonValue::Object(map)) => {
                map.insert(key.unwrap_or_default(), value);
            }
            Some(JsonValue::Array(items)) => items.push(value),
            // Frames only ever hold containers.
            Some(_) => {}
            None => self.document = Some(value),
        }
    }
}

impl Marshaller for JsonMarshaller {
    fn open_map(&mut self, name: Option<&str>) -> Result<()> {
        self.stack.push_map(name, JsonValue::Object(JsonMap::new()))
    }

    fn close_map(&mut self) -> Result<()> {
        let frame = self.stack.pop_map()?;
        self.attach(frame.label, frame.payload);
        Ok(())
    }

    fn open_array(&mut self, name: Option<&str>, len: usize) -> Result<()> {
        self.stack.declared_len(name, len)?;
        self.stack
            .push_array(name, len, JsonValue::Array(Vec::new()))
    }

    fn close_array(&mut self) -> Result<()> {
        let frame = self.stack.pop_array()?;
        self.attach(frame.label, frame.payload);
        Ok(())
    }

    fn write_i64(&mut self, name: Option<&str>, value: i64) -> Result<()> {
        self.put(name, JsonValue::Int(value))
    }

    fn write_f64(&mut self, name: Option<&str>, value: f64) -> Result<()> {
        self.finite(name, value)?;
        self.put(name, JsonValue::Float64(value))
    }

    fn write_str(&mut self, name: Option<&str>, value: &str) -> Result<()> {
        self.put(name, JsonValue::String(value.into()))
    }

    fn write_i32(&mut self, name: Option<&str>, value: i32) -> Result<()> {
        self.put(name, JsonValue::Int(value.into()))
    }

    fn write_bool(&mut self, name: Option<&str>, value: bool) -> Result<()> {
        self.put(name, JsonValue::Bool(value))
    }

    fn write_f32(&mut self, name: Option<&str>, value: f32) -> Result<()> {
        self.finite(name, value.into())?;
        self.put(name, JsonValue::Float32(value))
    }

    #[inline]
    fn check_complete(&mut self) -> Result<usize> {
        self.stack.check_complete()
    }

    #[inline]
    fn fail(&self, name: Option<&str>, kind: ErrorKind) -> MarshalError {
        self.stack.fail(name, kind)
    }
}
