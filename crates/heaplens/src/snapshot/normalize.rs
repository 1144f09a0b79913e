//! Conversion of arbitrary attribute and reference values into JSON-safe
//! form
//!
//! Every branch is bounded and total: oversized payloads are truncated,
//! non-finite numbers become their text form, and anything without a safer
//! rendering falls back to a `[type-name, identity]` pair.

use serde_json::{json, Value as JsonValue};

use crate::model::value::{range_elements, Value};
use crate::snapshot::reflect;

/// Cap applied to every truncatable rendering, in characters or elements.
pub const TRUNCATE_LIMIT: usize = 1000;

/// Normalize one value. First matching branch wins.
pub fn normalize(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => json!(*b),
        Value::Int(i) => json!(*i),
        Value::Float(f) => {
            if f.is_finite() {
                json!(*f)
            } else {
                JsonValue::String(f.to_string())
            }
        }
        Value::Str(s) => JsonValue::String(truncate_chars(s, TRUNCATE_LIMIT)),
        Value::Bytes(b) => JsonValue::String(render_bytes(b, TRUNCATE_LIMIT)),
        Value::Decimal(d) => JsonValue::String(d.clone()),
        Value::Rational { num, den } => JsonValue::String(format!("{}/{}", num, den)),
        Value::Complex { re, im } => JsonValue::String(format!("{}{:+}i", re, im)),
        Value::Range { start, stop, step } => JsonValue::String(format!(
            "{:?}",
            range_elements(*start, *stop, *step, TRUNCATE_LIMIT)
        )),
        Value::Ref(obj) => {
            let type_name = reflect::safe_type_name(&**obj);
            let id = reflect::safe_object_id(&**obj);
            json!([type_name, id.as_u64()])
        }
    }
}

/// First `limit` characters of `s`, never splitting a character.
fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Lossy text rendering of the first `limit` bytes.
fn render_bytes(bytes: &[u8], limit: usize) -> String {
    let end = bytes.len().min(limit);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
