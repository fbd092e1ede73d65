use std::fmt;

use serde_json::Value;

/// Result of one call, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Keys(Vec<String>),
    Value(String),
    Deleted(i64),
    Ack(String),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Keys(keys) => f.write_str(&format_keys(keys)),
            Output::Value(raw) => f.write_str(&format_value(raw)),
            Output::Deleted(n) => f.write_str(&format_deleted(*n)),
            Output::Ack(ack) => f.write_str(ack),
        }
    }
}

pub fn format_keys(keys: &[String]) -> String {
    keys.join("\n")
}

/// Pretty-print values that parse as JSON (2-space indent); anything else is shown raw.
pub fn format_value(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

pub fn format_deleted(n: i64) -> String {
    format!("Deleted {n} key(s)")
}
