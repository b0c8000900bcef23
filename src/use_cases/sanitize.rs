use serde_json::{Map, Value};

// Character budgets for persisted guest content.
pub const SHORT_FIELD_MAX_CHARS: usize = 100;
pub const FREE_TEXT_MAX_CHARS: usize = 1_000;

// Nested request data deeper than this is dropped rather than recursed into.
const MAX_DEPTH: usize = 8;

// Device-info keys copied through; anything else is dropped.
const DEVICE_INFO_KEYS: [&str; 4] = ["userAgent", "platform", "language", "screen"];

// Strips markup-significant characters and truncates to the field budget.
// Never errors; applying it twice yields the same output.
pub fn sanitize_string(value: &str, max_chars: usize) -> String {
    value
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(max_chars)
        .collect()
}

// Recursively sanitizes content that will be persisted or echoed. Strings are
// cleaned element-wise, numbers/booleans/null pass through unchanged.
pub fn sanitize_json(value: Value, max_chars: usize) -> Value {
    sanitize_json_at(value, max_chars, 0)
}

fn sanitize_json_at(value: Value, max_chars: usize, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    match value {
        Value::String(s) => Value::String(sanitize_string(&s, max_chars)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| sanitize_json_at(item, max_chars, depth + 1))
                .collect(),
        ),
        Value::Object(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, entry) in entries {
                let key = sanitize_string(&key, SHORT_FIELD_MAX_CHARS);
                out.insert(key, sanitize_json_at(entry, max_chars, depth + 1));
            }
            Value::Object(out)
        }
        other => other,
    }
}

// Rebuilds device info through the explicit key allow-list; unknown keys are
// dropped rather than copied through.
pub fn sanitize_device_info(value: Value) -> Value {
    let Value::Object(entries) = value else {
        return Value::Object(Map::new());
    };
    let mut out = Map::new();
    for key in DEVICE_INFO_KEYS {
        if let Some(entry) = entries.get(key) {
            if let Value::String(s) = entry {
                out.insert(
                    key.to_string(),
                    Value::String(sanitize_string(s, SHORT_FIELD_MAX_CHARS)),
                );
            }
        }
    }
    Value::Object(out)
}
