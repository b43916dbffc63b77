use alloc::string::String;

use crate::{Error, JsonValue};

const INDENT: &str = "  ";

// -----------------------------------------------------------------------------
// Printers

impl JsonValue {
    /// Renders the value without structural whitespace.
    #[inline]
    pub fn to_compact_string(&self) -> Result<String, Error> {
        serde_json::to_string(self)
    }

    /// Renders the value with two-space indentation, one element per line.
    #[inline]
    pub fn to_pretty_string(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self)
    }

    /// Renders like [`to_pretty_string`](Self::to_pretty_string), except that
    /// an array holding only scalars stays on a single line.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_json::JsonValue;
    ///
    /// let value = JsonValue::from_str(r#"{"xs": [1, 2, 3], "m": {"k": []}}"#).unwrap();
    /// let text = value.to_compact_pretty_string().unwrap();
    ///
    /// assert_eq!(text, "{\n  \"xs\": [1, 2, 3],\n  \"m\": {\n    \"k\": []\n  }\n}");
    /// ```
    pub fn to_compact_pretty_string(&self) -> Result<String, Error> {
        let mut out = String::new();
        write_compact_pretty(&mut out, self, 0)?;
        Ok(out)
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_compact_pretty(out: &mut String, value: &JsonValue, depth: usize) -> Result<(), Error> {
    match value {
        JsonValue::Array(items) if items.is_empty() => out.push_str("[]"),
        JsonValue::Array(items) if items.iter().all(|item| item.kind().is_scalar()) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                out.push_str(&serde_json::to_string(item)?);
            }
            out.push(']');
        }
        JsonValue::Array(items) => {
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, depth + 1);
                write_compact_pretty(out, item, depth + 1)?;
            }
            out.push('\n');
            push_indent(out, depth);
            out.push(']');
        }
        JsonValue::Object(map) if map.is_empty() => out.push_str("{}"),
        JsonValue::Object(map) => {
            out.push_str("{\n");
            for (index, (key, item)) in map.iter().enumerate() {
                if index > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, depth + 1);
                out.push_str(&serde_json::to_string(key)?);
                out.push_str(": ");
                write_compact_pretty(out, item, depth + 1)?;
            }
            out.push('\n');
            push_indent(out, depth);
            out.push('}');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}
