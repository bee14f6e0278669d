//! Indexer configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of declarative profile files (`<name>.yaml`), loaded at
    /// startup next to the built-in profiles.
    #[serde(default)]
    pub profiles_dir: Option<PathBuf>,
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            profiles_dir: None,
            max_request_bytes: default_max_request_bytes(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let settings: Settings =
            serde_yaml::from_str(&contents).with_context(|| "parse indexer config yaml")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_request_bytes == 0 {
            anyhow::bail!("max_request_bytes must be greater than 0");
        }
        if let Some(dir) = &self.profiles_dir {
            if !dir.is_dir() {
                anyhow::bail!("profiles_dir is not a directory: {}", dir.display());
            }
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
    7100
}

fn default_max_request_bytes() -> usize {
    1_048_576
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 7100);
        assert_eq!(settings.max_request_bytes, 1_048_576);
        assert!(settings.profiles_dir.is_none());
        settings.validate().unwrap();
    }

    #[test]
    fn missing_profiles_dir_fails_validation() {
        let settings = Settings {
            profiles_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
