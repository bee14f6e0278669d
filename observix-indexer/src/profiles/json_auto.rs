//! json_auto profile
//!
//! Attempts to parse each line as a JSON object and extract its fields.
//! Anything that is not a JSON object comes back untouched.

use serde_json::{Map, Value};

use super::Profile;

pub struct JsonAuto;

impl Profile for JsonAuto {
    fn normalize(&self, raw: &str) -> Map<String, Value> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('{') {
            return Map::new();
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}
