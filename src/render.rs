//! Plain-text rendering of backend payloads.
//!
//! Payloads are printed in the literal notation orchestrators already see from
//! the Jaqpot tooling: `{'key': value}` mappings, `[a, b]` sequences,
//! `True` / `False` / `None`. Key order follows the payload.

use itertools::Itertools;
use serde_json::Value;

/// Render a JSON value as plain text.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            out.push('[');
            out.push_str(&items.iter().map(render).join(", "));
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            let mut entries = map.iter().map(|(k, v)| {
                let mut entry = String::new();
                write_str(&mut entry, k);
                entry.push_str(": ");
                write_value(&mut entry, v);
                entry
            });
            out.push_str(&entries.join(", "));
            out.push('}');
        }
    }
}

// Single quotes unless the text contains one and no double quote.
fn write_str(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
