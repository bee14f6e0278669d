//! Declarative profiles loaded from `profiles_dir`
//!
//! Each `<name>.yaml` file defines one regex-driven profile: named capture
//! groups become extracted fields. Lines that do not match yield no fields.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::Profile;

#[derive(Debug, Deserialize)]
struct ProfileFile {
    kind: ProfileKind,
    pattern: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ProfileKind {
    Regex,
}

pub struct RegexProfile {
    pattern: Regex,
}

impl RegexProfile {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).with_context(|| "compile profile pattern")?;
        Ok(Self { pattern })
    }
}

impl Profile for RegexProfile {
    fn normalize(&self, raw: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        let Some(captures) = self.pattern.captures(raw) else {
            return fields;
        };

        for name in self.pattern.capture_names().flatten() {
            if let Some(value) = captures.name(name) {
                fields.insert(name.to_string(), Value::String(value.as_str().to_string()));
            }
        }
        fields
    }
}

/// Load every `*.yaml` profile definition under `dir`.
pub fn load_dir(dir: &Path) -> Result<Vec<(String, RegexProfile)>> {
    let mut profiles = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read profile file: {}", path.display()))?;
        let definition: ProfileFile = serde_yaml::from_str(&contents)
            .with_context(|| format!("parse profile file: {}", path.display()))?;

        let ProfileKind::Regex = definition.kind;
        let profile = RegexProfile::new(&definition.pattern)
            .with_context(|| format!("invalid profile: {}", path.display()))?;
        profiles.push((name.to_string(), profile));
    }

    Ok(profiles)
}
