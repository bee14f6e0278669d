//! kv_pairs profile
//!
//! Parses `key=value key2=value2 ...` tokens; tokens without `=` are skipped.

use serde_json::{Map, Value};

use super::Profile;

pub struct KvPairs;

impl Profile for KvPairs {
    fn normalize(&self, raw: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        for part in raw.split_whitespace() {
            if let Some((key, value)) = part.split_once('=') {
                if !key.is_empty() {
                    fields.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_extracted() {
        let fields = KvPairs.normalize("level=warn code=502 msg=upstream_timeout");
        assert_eq!(fields.get("level"), Some(&serde_json::json!("warn")));
        assert_eq!(fields.get("code"), Some(&serde_json::json!("502")));
        assert_eq!(fields.get("msg"), Some(&serde_json::json!("upstream_timeout")));
    }

    #[test]
    fn tokens_without_equals_are_skipped() {
        let fields = KvPairs.normalize("plain words only");
        assert!(fields.is_empty());
    }
}
