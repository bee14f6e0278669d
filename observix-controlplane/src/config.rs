//! Control plane configuration
//!
//! Loaded from a YAML file; every field except `database_url` has a default
//! suitable for local development.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// SQLite URI of the embedded store, e.g. `sqlite:data/observix.db`.
    pub database_url: String,
    #[serde(default = "default_offline_threshold")]
    pub agent_offline_threshold_seconds: i64,
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,
}

impl Settings {
    /// Load and validate settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let settings: Settings =
            serde_yaml::from_str(&contents).with_context(|| "parse control plane config yaml")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("database_url cannot be empty");
        }
        if self.agent_offline_threshold_seconds <= 0 {
            anyhow::bail!("agent_offline_threshold_seconds must be greater than 0");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7000
}

fn default_offline_threshold() -> i64 {
    20
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}
