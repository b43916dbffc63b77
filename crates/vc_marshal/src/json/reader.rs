use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::{self, Vec};
use std::io;

use vc_json::{JsonKind, JsonMap, JsonValue};

use super::{KeyPolicy, ValueKind};
use crate::context::{ContextStack, Frame, FrameState, new_name_set};
use crate::{ContextKind, ErrorKind, MarshalError, Result, StructureError, Unmarshaller};

/// What is left to read in one open context.
#[derive(Debug)]
enum Source {
    /// Values are taken out by key, leaving `null` behind.
    Map(JsonMap),
    /// Values are taken out in order.
    Array(vec::IntoIter<JsonValue>),
}

// -----------------------------------------------------------------------------
// JsonUnmarshaller

/// An [`Unmarshaller`] walking an ordered JSON tree.
///
/// Map entries are looked up by name, so fields may be read in any order;
/// closing a map with [`KeyPolicy::Strict`] fails if a key was never read.
/// Arrays take their length from the tree.
///
/// # Examples
///
/// ```
/// use vc_marshal::{JsonUnmarshaller, KeyPolicy, Unmarshaller, ValueKind};
///
/// let mut u = JsonUnmarshaller::from_str(r#"{"id": 7, "tags": ["a"], "extra": null}"#).unwrap();
/// u.open_map(None).unwrap();
/// assert_eq!(u.peek_kind(Some("id")).unwrap(), ValueKind::Int32);
/// assert_eq!(u.read_i32(Some("id")).unwrap(), 7);
/// assert_eq!(u.open_array(Some("tags")).unwrap(), 1);
/// assert_eq!(u.read_string(None).unwrap(), "a");
/// u.close_array().unwrap();
/// let unused = u.close_map_with(KeyPolicy::Lenient).unwrap();
/// assert_eq!(unused, ["extra"]);
/// assert!(u.check_processed().unwrap());
/// ```
pub struct JsonUnmarshaller {
    stack: ContextStack<Source>,
    root: Option<JsonValue>,
}

impl JsonUnmarshaller {
    /// Reads from an already-built tree. The top level must be an object or
    /// an array.
    #[inline]
    pub const fn from_value(value: JsonValue) -> Self {
        Self {
            stack: ContextStack::single(),
            root: Some(value),
        }
    }

    /// Parses `text` and reads from the result.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        let value = JsonValue::from_str(text).map_err(ErrorKind::from)?;
        Ok(Self::from_value(value))
    }

    /// Parses everything `reader` yields and reads from the result.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let value = JsonValue::from_reader(reader).map_err(ErrorKind::from)?;
        Ok(Self::from_value(value))
    }

    /// Opens a map and adds every key physically present in it to `keys`,
    /// whether or not it is read later.
    pub fn open_map_collecting<E>(&mut self, name: Option<&str>, keys: &mut E) -> Result<()>
    where
        E: Extend<String>,
    {
        self.open_map(name)?;
        if let Some(Source::Map(map)) = self.stack.top().map(|frame| &frame.payload) {
            keys.extend(map.keys().cloned());
        }
        Ok(())
    }

    /// Closes the innermost map under `policy` and returns the keys that were
    /// never read, in document order.
    ///
    /// Under [`KeyPolicy::Strict`] a non-empty result is an error instead and
    /// the map stays open.
    pub fn close_map_with(&mut self, policy: KeyPolicy) -> Result<Vec<String>> {
        self.stack.expect_top(ContextKind::Map)?;
        let unused = self.unused_keys();
        if !unused.is_empty() {
            match policy {
                KeyPolicy::Strict => {
                    return Err(self.stack.fail(None, StructureError::UnconsumedKeys(unused)));
                }
                KeyPolicy::Lenient => log::debug!(
                    "ignoring {} unread key(s) at {}: {unused:?}",
                    unused.len(),
                    self.stack.location(None)
                ),
            }
        }
        self.stack.pop_map()?;
        Ok(unused)
    }

    /// Classifies the next value without consuming it: the entry `name` in
    /// a map, the next element in an array, or the document at the root.
    pub fn peek_kind(&self, name: Option<&str>) -> Result<ValueKind> {
        let value = match self.stack.top() {
            Some(Frame {
                state: FrameState::Map { seen },
                payload: Source::Map(map),
                ..
            }) => name
                .filter(|name| !seen.contains(*name))
                .and_then(|name| map.get(name)),
            Some(Frame {
                payload: Source::Array(items),
                ..
            }) => items.as_slice().first(),
            Some(_) => None,
            None => self.root.as_ref(),
        };
        value
            .map(ValueKind::of)
            .ok_or_else(|| self.stack.fail(name, self.missing(name)))
    }

    /// Whether the innermost map still holds an unread entry `name`.
    pub fn contains(&self, name: &str) -> bool {
        match self.stack.top() {
            Some(Frame {
                state: FrameState::Map { seen },
                payload: Source::Map(map),
                ..
            }) => !seen.contains(name) && map.contains_key(name),
            _ => false,
        }
    }

    /// Unread elements of the innermost array, or `None` outside an array.
    pub fn remaining(&self) -> Option<usize> {
        match self.stack.top().map(|frame| &frame.payload) {
            Some(Source::Array(items)) => Some(items.len()),
            _ => None,
        }
    }

    /// Reads an object or array back out as compact JSON text; `null` reads
    /// as the empty string.
    pub fn read_raw_json(&mut self, name: Option<&str>) -> Result<String> {
        let value = self.scalar(name)?;
        match value {
            JsonValue::Null => Ok(String::new()),
            JsonValue::Object(_) | JsonValue::Array(_) => value
                .to_compact_string()
                .map_err(|e| self.stack.fail(name, e)),
            other => Err(self.mismatch(name, "object or array", other.kind())),
        }
    }

    /// Reads a whole subtree as a value.
    pub fn read_value(&mut self, name: Option<&str>) -> Result<JsonValue> {
        self.scalar(name)
    }

    /// Reads an explicit `null`.
    pub fn read_null(&mut self, name: Option<&str>) -> Result<()> {
        match self.scalar(name)? {
            JsonValue::Null => Ok(()),
            other => Err(self.mismatch(name, "null", other.kind())),
        }
    }

    /// The tree flavor of the completion check: whether the one top-level
    /// object has been read.
    #[inline]
    pub fn check_processed(&self) -> Result<bool> {
        self.stack.check_complete().map(|count| count > 0)
    }

    fn unused_keys(&self) -> Vec<String> {
        match self.stack.top() {
            Some(Frame {
                state: FrameState::Map { seen },
                payload: Source::Map(map),
                ..
            }) => map
                .keys()
                .filter(|key| !seen.contains(*key))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }

    fn missing(&self, name: Option<&str>) -> StructureError {
        match self.stack.top().map(|frame| &frame.state) {
            Some(FrameState::Map { .. }) => {
                StructureError::MissingKey(name.unwrap_or_default().to_owned())
            }
            Some(FrameState::Array { len, .. }) => StructureError::ArrayOverrun { declared: *len },
            None => StructureError::RootExhausted,
        }
    }

    fn mismatch(&self, name: Option<&str>, expected: &'static str, found: JsonKind) -> MarshalError {
        self.stack.fail(name, ErrorKind::Type { expected, found })
    }

    /// Takes the next value out of the innermost context. The name must
    /// already have been accepted by the stack.
    fn next_value(&mut self, name: Option<&str>) -> Result<JsonValue> {
        let value = match self.stack.top_mut().map(|frame| &mut frame.payload) {
            Some(Source::Map(map)) => name.and_then(|name| map.get_mut(name)).map(JsonValue::take),
            Some(Source::Array(items)) => items.next(),
            None => self.root.take(),
        };
        value.ok_or_else(|| self.stack.fail(name, self.missing(name)))
    }

    fn scalar(&mut self, name: Option<&str>) -> Result<JsonValue> {
        self.stack.visit_scalar(name)?;
        self.next_value(name)
    }
}

impl Unmarshaller for JsonUnmarshaller {
    fn open_map(&mut self, name: Option<&str>) -> Result<()> {
        self.stack.enter(name)?;
        match self.next_value(name)? {
            JsonValue::Object(map) => {
                let state = FrameState::Map { seen: new_name_set() };
                self.stack.push(state, name, Source::Map(map));
                Ok(())
            }
            other => Err(self.mismatch(name, "object", other.kind())),
        }
    }

    #[inline]
    fn close_map(&mut self) -> Result<()> {
        self.close_map_with(KeyPolicy::Strict).map(drop)
    }

    fn open_array(&mut self, name: Option<&str>) -> Result<usize> {
        self.stack.enter(name)?;
        match self.next_value(name)? {
            JsonValue::Array(items) => {
                let len = items.len();
                let state = FrameState::Array { len, index: 0 };
                self.stack.push(state, name, Source::Array(items.into_iter()));
                Ok(len)
            }
            other => Err(self.mismatch(name, "array", other.kind())),
        }
    }

    #[inline]
    fn close_array(&mut self) -> Result<()> {
        self.stack.pop_array().map(drop)
    }

    fn read_i64(&mut self, name: Option<&str>) -> Result<i64> {
        match self.scalar(name)? {
            JsonValue::Int(v) => Ok(v),
            other => Err(self.mismatch(name, "integer", other.kind())),
        }
    }

    fn read_f64(&mut self, name: Option<&str>) -> Result<f64> {
        match self.scalar(name)? {
            JsonValue::Int(v) => Ok(v as f64),
            JsonValue::Float32(v) => Ok(v.into()),
            JsonValue::Float64(v) => Ok(v),
            other => Err(self.mismatch(name, "number", other.kind())),
        }
    }

    fn read_string(&mut self, name: Option<&str>) -> Result<String> {
        match self.scalar(name)? {
            JsonValue::String(v) => Ok(v),
            JsonValue::Null => Err(self.stack.fail(name, ErrorKind::NullString)),
            other => Err(self.mismatch(name, "string", other.kind())),
        }
    }

    fn read_i32(&mut self, name: Option<&str>) -> Result<i32> {
        match self.scalar(name)? {
            JsonValue::Int(v) => i32::try_from(v).map_err(|_| {
                self.stack.fail(name, ErrorKind::Range {
                    value: v,
                    min: i32::MIN.into(),
                    max: i32::MAX.into(),
                })
            }),
            other => Err(self.mismatch(name, "integer", other.kind())),
        }
    }

    fn read_bool(&mut self, name: Option<&str>) -> Result<bool> {
        match self.scalar(name)? {
            JsonValue::Bool(v) => Ok(v),
            other => Err(self.mismatch(name, "boolean", other.kind())),
        }
    }

    fn read_f32(&mut self, name: Option<&str>) -> Result<f32> {
        match self.scalar(name)? {
            JsonValue::Int(v) => Ok(v as f32),
            JsonValue::Float32(v) => Ok(v),
            JsonValue::Float64(v) => Ok(v as f32),
            other => Err(self.mismatch(name, "number", other.kind())),
        }
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

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeSet;
    use alloc::vec;
    use alloc::vec::Vec;

    use vc_json::JsonKind;

    use super::JsonUnmarshaller;
    use crate::json::{JsonMarshaller, KeyPolicy, ValueKind};
    use crate::{ErrorKind, Marshaller, StructureError, Unmarshaller};

    const DOC: &str = r#"{
        "small": 5,
        "big": 5000000000,
        "ratio": 0.25,
        "label": "",
        "none": null,
        "flags": [true, false],
        "nested": {"k": 1}
    }"#;

    #[test]
    fn reads_by_name_in_any_order() {
        let mut u = JsonUnmarshaller::from_str(DOC).unwrap();
        u.open_map(None).unwrap();
        assert_eq!(u.read_string(Some("label")).unwrap(), "");
        assert_eq!(u.read_i64(Some("big")).unwrap(), 5_000_000_000);
        assert_eq!(u.read_f32(Some("ratio")).unwrap(), 0.25);
        assert_eq!(u.read_i32(Some("small")).unwrap(), 5);
        u.read_null(Some("none")).unwrap();
        assert_eq!(u.open_array(Some("flags")).unwrap(), 2);
        assert_eq!(u.remaining(), Some(2));
        assert!(u.read_bool(None).unwrap());
        assert!(!u.read_bool(None).unwrap());
        u.close_array().unwrap();
        u.open_map(Some("nested")).unwrap();
        assert_eq!(u.read_i64(Some("k")).unwrap(), 1);
        u.close_map().unwrap();
        u.close_map().unwrap();
        assert_eq!(u.check_complete().unwrap(), 1);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut u = JsonUnmarshaller::from_str(DOC).unwrap();
        assert_eq!(u.peek_kind(None).unwrap(), ValueKind::Map);
        u.open_map(None).unwrap();
        assert_eq!(u.peek_kind(Some("small")).unwrap(), ValueKind::Int32);
        assert_eq!(u.peek_kind(Some("big")).unwrap(), ValueKind::Int64);
        assert_eq!(u.peek_kind(Some("ratio")).unwrap(), ValueKind::Float64);
        assert_eq!(u.peek_kind(Some("none")).unwrap(), ValueKind::Null);
        assert_eq!(u.peek_kind(Some("flags")).unwrap(), ValueKind::Array);
        assert!(u.contains("small"));
        u.read_i32(Some("small")).unwrap();
        assert!(!u.contains("small"));
        assert!(!u.contains("absent"));
        let err = u.peek_kind(Some("small")).unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::MissingKey("small".into())));
    }

    #[test]
    fn strict_close_rejects_unread_keys() {
        let mut u = JsonUnmarshaller::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        u.open_map(None).unwrap();
        u.read_i32(Some("a")).unwrap();
        let err = u.close_map().unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::UnconsumedKeys(vec!["b".into()])));
        assert!(err.is_data_error());

        let unused = u.close_map_with(KeyPolicy::Lenient).unwrap();
        assert_eq!(unused, ["b"]);
        assert!(u.check_processed().unwrap());
    }

    #[test]
    fn collects_present_keys() {
        let mut u = JsonUnmarshaller::from_str(r#"{"z": 1, "y": 2}"#).unwrap();
        let mut keys = BTreeSet::new();
        u.open_map_collecting(None, &mut keys).unwrap();
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), ["y", "z"]);
    }

    #[test]
    fn type_and_range_errors() {
        let mut u = JsonUnmarshaller::from_str(DOC).unwrap();
        u.open_map(None).unwrap();
        let err = u.read_i32(Some("big")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Range { value: 5_000_000_000, .. }));
        let err = u.read_string(Some("none")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NullString));
        let err = u.read_i64(Some("ratio")).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Type { expected: "integer", found: JsonKind::Float64 }
        ));
        let err = u.open_array(Some("nested")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Type { expected: "array", .. }));
        let err = u.read_bool(Some("missing")).unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::MissingKey("missing".into())));
    }

    #[test]
    fn partial_array_read_fails_on_close() {
        let mut u = JsonUnmarshaller::from_str("[1, 2, 3]").unwrap();
        u.open_array_exact(None, 3).unwrap();
        u.read_i32(None).unwrap();
        let err = u.close_array().unwrap_err();
        assert_eq!(
            err.structure(),
            Some(&StructureError::ArrayLength { declared: 3, actual: 1 })
        );
    }

    #[test]
    fn reading_past_the_array_end_is_an_overrun() {
        let mut u = JsonUnmarshaller::from_str("[1]").unwrap();
        assert_eq!(u.open_array(None).unwrap(), 1);
        assert_eq!(u.read_i32(None).unwrap(), 1);
        assert_eq!(u.remaining(), Some(0));
        let err = u.peek_kind(None).unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::ArrayOverrun { declared: 1 }));
        let err = u.read_i32(None).unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::ArrayOverrun { declared: 1 }));
        assert!(err.is_data_error());
        u.close_array().unwrap();
    }

    #[test]
    fn peek_reports_the_stored_width() {
        let mut m = JsonMarshaller::new();
        m.open_map(None).unwrap();
        m.write_f32(Some("f"), 0.5).unwrap();
        m.write_f64(Some("d"), 0.5).unwrap();
        m.write_i64(Some("small"), 7).unwrap();
        m.write_i64(Some("wide"), i64::from(i32::MIN) - 1).unwrap();
        m.close_map().unwrap();

        let mut u = JsonUnmarshaller::from_value(m.into_document().unwrap());
        u.open_map(None).unwrap();
        assert_eq!(u.peek_kind(Some("f")).unwrap(), ValueKind::Float32);
        assert_eq!(u.peek_kind(Some("d")).unwrap(), ValueKind::Float64);
        assert_eq!(u.peek_kind(Some("small")).unwrap(), ValueKind::Int32);
        assert_eq!(u.peek_kind(Some("wide")).unwrap(), ValueKind::Int64);
        assert_eq!(u.read_f32(Some("f")).unwrap(), 0.5);
    }

    #[test]
    fn ranged_long_reads() {
        let mut u = JsonUnmarshaller::from_str(DOC).unwrap();
        u.open_map(None).unwrap();
        assert_eq!(u.read_i64_in(Some("small"), 0, 10).unwrap(), 5);
        let err = u.read_i64_in(Some("big"), 0, 1_000).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Range { value: 5_000_000_000, min: 0, max: 1_000 }
        ));
        assert!(err.is_data_error());
    }

    #[test]
    fn raw_json_reads_back_as_text() {
        let text = r#"{"raw": {"b": [1, 2.5]}, "empty": null, "n": 3}"#;
        let mut u = JsonUnmarshaller::from_str(text).unwrap();
        u.open_map(None).unwrap();
        assert_eq!(u.read_raw_json(Some("raw")).unwrap(), r#"{"b":[1,2.5]}"#);
        assert_eq!(u.read_raw_json(Some("empty")).unwrap(), "");
        assert!(u.read_raw_json(Some("n")).is_err());
    }

    #[test]
    fn one_top_level_object() {
        let mut u = JsonUnmarshaller::from_str("[]").unwrap();
        assert!(!u.check_processed().unwrap());
        assert_eq!(u.open_array(None).unwrap(), 0);
        u.close_array().unwrap();
        let err = u.open_array(None).unwrap_err();
        assert_eq!(err.structure(), Some(&StructureError::RootExhausted));
    }

    #[test]
    fn invalid_text_is_a_data_error() {
        let err = JsonUnmarshaller::from_str("{\"a\": ").err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::InvalidJson(_)));
        assert!(err.is_data_error());
    }
}
