//! Passthrough profile: no extracted fields

use serde_json::{Map, Value};

use super::Profile;

pub struct Passthrough;

impl Profile for Passthrough {
    fn normalize(&self, _raw: &str) -> Map<String, Value> {
        Map::new()
    }
}
