//! Agent registration domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agent record with status computed from `last_seen_at` at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: String,
    pub region: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub status: AgentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Offline,
}

impl AgentStatus {
    /// Online iff the agent polled within the offline threshold.
    pub fn from_last_seen(
        last_seen_at: DateTime<Utc>,
        now: DateTime<Utc>,
        threshold_seconds: i64,
    ) -> Self {
        if now - last_seen_at <= chrono::Duration::seconds(threshold_seconds) {
            AgentStatus::Online
        } else {
            AgentStatus::Offline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_flips_at_threshold() {
        let now = Utc::now();
        let fresh = now - chrono::Duration::seconds(5);
        let stale = now - chrono::Duration::seconds(21);

        assert_eq!(
            AgentStatus::from_last_seen(fresh, now, 20),
            AgentStatus::Online
        );
        assert_eq!(
            AgentStatus::from_last_seen(stale, now, 20),
            AgentStatus::Offline
        );
    }
}
