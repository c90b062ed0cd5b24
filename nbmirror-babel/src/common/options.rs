//! Cell option codec
//!
//! Cell metadata travels on marker lines either as space separated `key=<json>` pairs or,
//! when a key cannot be written bare, as a single JSON object. Keys are emitted sorted so
//! the output is deterministic.

use crate::notebook::Metadata;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

static OPTION_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("valid option key regex"));

/// Encode metadata as marker-line options. Empty metadata encodes to an empty string.
pub fn encode_options(metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return String::new();
    }
    if !metadata.keys().all(|key| OPTION_KEY.is_match(key)) {
        return Value::Object(metadata.clone()).to_string();
    }
    let sorted: BTreeMap<&String, &Value> = metadata.iter().collect();
    sorted
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode marker-line options. The error is a human readable reason.
pub fn parse_options(text: &str) -> Result<Metadata, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Metadata::new());
    }
    if text.starts_with('{') {
        return match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err("options must be a JSON object".to_string()),
            Err(err) => Err(format!("invalid JSON options: {err}")),
        };
    }

    let mut metadata = Metadata::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (key, after) = rest
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, found '{rest}'"))?;
        if !OPTION_KEY.is_match(key) {
            return Err(format!("invalid option key '{key}'"));
        }
        if after.starts_with(char::is_whitespace) || after.is_empty() {
            return Err(format!("missing value for option '{key}'"));
        }
        let mut values = serde_json::Deserializer::from_str(after).into_iter::<Value>();
        let value = match values.next() {
            Some(Ok(value)) => value,
            Some(Err(err)) => return Err(format!("invalid value for option '{key}': {err}")),
            None => return Err(format!("missing value for option '{key}'")),
        };
        let tail = &after[values.byte_offset()..];
        if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
            return Err(format!("unexpected text after option '{key}'"));
        }
        if metadata.insert(key.to_string(), value).is_some() {
            return Err(format!("duplicate option '{key}'"));
        }
        rest = tail.trim_start();
    }
    Ok(metadata)
}
