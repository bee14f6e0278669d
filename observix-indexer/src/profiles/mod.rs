//! Normalization profiles
//!
//! A profile turns one raw line into extracted fields. The engine (api layer)
//! owns the `raw` invariant: whatever a profile returns, the final document
//! always carries the original line under `raw`.

mod file;
mod json_auto;
mod kv_pairs;
mod passthrough;

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde_json::{Map, Value};

pub use file::RegexProfile;
pub use json_auto::JsonAuto;
pub use kv_pairs::KvPairs;
pub use passthrough::Passthrough;

/// One named normalization behavior.
pub trait Profile: Send + Sync {
    /// Extract structured fields from one raw line.
    ///
    /// Returning an empty map is fine; the document then only carries `raw`.
    fn normalize(&self, raw: &str) -> Map<String, Value>;
}

/// Registry of profiles known to this indexer instance.
pub struct ProfileRegistry {
    profiles: HashMap<String, Box<dyn Profile>>,
}

impl ProfileRegistry {
    /// Registry with only the built-in profiles.
    pub fn builtin() -> Self {
        let mut profiles: HashMap<String, Box<dyn Profile>> = HashMap::new();
        profiles.insert("passthrough".to_string(), Box::new(Passthrough));
        profiles.insert("json_auto".to_string(), Box::new(JsonAuto));
        profiles.insert("kv_pairs".to_string(), Box::new(KvPairs));
        Self { profiles }
    }

    /// Built-ins plus every declarative profile file under `dir`.
    ///
    /// Files are `<name>.yaml`; a file whose stem collides with a built-in
    /// replaces it.
    pub fn with_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::builtin();
        for (name, profile) in file::load_dir(dir)? {
            tracing::info!("Loaded profile '{}' from {}", name, dir.display());
            registry.profiles.insert(name, Box::new(profile));
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Profile> {
        self.profiles.get(name).map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
