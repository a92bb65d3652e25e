//! Escaping of field values for Telegram's legacy `Markdown` parse mode.

use std::borrow::Cow;

use serde_json::Value;

/// Characters with markup meaning in legacy Markdown.
pub const METACHARACTERS: [char; 5] = ['_', '*', '[', ']', '`'];

/// Inserted before every metacharacter.
pub const ESCAPE_MARKER: char = '\\';

/// Render a field value as text safe to embed in a message.
///
/// Absent and `null` values render as the empty string. Escaping is not
/// idempotent: an already escaped string gains a second marker before each
/// metacharacter, while its existing markers pass through untouched.
pub fn escape(value: Option<&Value>) -> String {
    escape_text(&coerce(value))
}

/// Escape raw text.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if METACHARACTERS.contains(&c) {
            out.push(ESCAPE_MARKER);
        }
        out.push(c);
    }
    out
}

/// Text representation of a value, before escaping.
pub fn coerce(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(Value::Bool(b)) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Some(Value::Number(n)) => Cow::Owned(n.to_string()),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => Cow::Owned(nested.to_string()),
    }
}
