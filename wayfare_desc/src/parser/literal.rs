//! Value-literal parser: the right-hand side of a property line, or one
//! element of an array.
//!
//! Attempts run in a fixed order and the first success wins; every failure
//! falls through to a less specific reading, bottoming out at a bare string.
//! The function is total — any input produces a [`Value`], never an error.
//! Unquoted bare words (including non-ASCII, e.g. `name: Лес`) are legal
//! strings by design.

use wayfare_data::Value;

use crate::json::from_json;

pub(crate) fn parse_value(raw: &str) -> Value {
    let mut text = raw.trim();
    // Tolerate one trailing comma from authoring habits.
    if let Some(stripped) = text.strip_suffix(',') {
        text = stripped.trim_end();
    }
    if text.is_empty() {
        return Value::String(String::new());
    }
    if let Some(inner) = unwrap_quotes(text) {
        // Verbatim: quoting strips the delimiters and nothing else.
        return Value::String(inner.to_string());
    }
    if text.contains('.') {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    } else if let Ok(n) = text.parse::<i64>() {
        return Value::Integer(n);
    }
    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        let inner = &text[1..text.len() - 1];
        let items = split_top_level_commas(inner).into_iter().map(parse_value).collect();
        return Value::Array(items);
    }
    if text.len() >= 2 && text.starts_with('{') && text.ends_with('}') {
        // Inline object literal: authors may single-quote keys/strings, so
        // normalize to double quotes and decode as JSON. Failure falls
        // through rather than erroring.
        let normalized = text.replace('\'', "\"");
        if let Ok(decoded) = serde_json::from_str::<serde_json::Value>(&normalized) {
            return from_json(decoded);
        }
    }
    if text.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(text.to_string())
}

/// Strip matching single or double quotes, if the text is wrapped in them.
fn unwrap_quotes(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0] {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Split array-literal contents on commas at nesting depth zero only.
/// Commas inside `{…}`, `[…]`, or a quoted run do not split. Empty segments
/// are dropped, so `[]` and `[1,, 2]` behave sensibly.
fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut start = 0usize;
    let bytes = s.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth -= 1,
            b',' if depth == 0 => {
                let part = s[start..i].trim();
                if !part.is_empty() {
                    out.push(part);
                }
                start = i + 1;
            },
            _ => {},
        }
    }
    if start < s.len() {
        let tail = s[start..].trim();
        if !tail.is_empty() {
            out.push(tail);
        }
    }
    out
}
