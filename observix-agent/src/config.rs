//! Agent configuration
//!
//! Loaded from a YAML file. All intervals are configurable to allow tuning
//! for different deployment scenarios.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Unique identifier for this agent instance
    pub agent_id: String,

    /// Region tag this agent polls assignments for
    pub region: String,

    /// Control plane connection settings
    pub control_plane: ControlPlaneRef,

    /// How often to poll the control plane for assignments
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// How long a stopping pipeline may take before its tasks are abandoned
    #[serde(default = "default_shutdown_deadline")]
    pub shutdown_deadline_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlPlaneRef {
    /// Control plane base URL (e.g., "http://127.0.0.1:7000")
    pub url: String,
}

impl AgentConfig {
    /// Load and validate the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let config: AgentConfig =
            serde_yaml::from_str(&contents).with_context(|| "parse agent config yaml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.agent_id.trim().is_empty() {
            anyhow::bail!("agent_id cannot be empty");
        }

        if self.region.trim().is_empty() {
            anyhow::bail!("region cannot be empty");
        }

        if !self.control_plane.url.starts_with("http://")
            && !self.control_plane.url.starts_with("https://")
        {
            anyhow::bail!("control_plane.url must start with http:// or https://");
        }

        if self.poll_interval_seconds == 0 {
            anyhow::bail!("poll_interval_seconds must be greater than 0");
        }

        if self.shutdown_deadline_seconds == 0 {
            anyhow::bail!("shutdown_deadline_seconds must be greater than 0");
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn shutdown_deadline(&self) -> Duration {
        Duration::from_secs(self.shutdown_deadline_seconds)
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_shutdown_deadline() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> AgentConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse(
            "agent_id: agent-a\nregion: eu-west-1\ncontrol_plane:\n  url: http://127.0.0.1:7000\n",
        );
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.shutdown_deadline(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut config = parse(
            "agent_id: agent-a\nregion: eu-west-1\ncontrol_plane:\n  url: http://127.0.0.1:7000\n",
        );

        config.agent_id = String::new();
        assert!(config.validate().is_err());

        config.agent_id = "agent-a".to_string();
        config.control_plane.url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.control_plane.url = "http://127.0.0.1:7000".to_string();
        config.poll_interval_seconds = 0;
        assert!(config.validate().is_err());
    }
}
