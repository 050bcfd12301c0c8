use std::time::Duration;

use serde::Deserialize;

/// Tunable knobs for one purge run.
///
/// Every field has a default, so a partial YAML section (or none at all)
/// deserializes cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    /// How long the confirmation gate waits for the owner's reply.
    pub confirm_timeout_secs: u64,

    /// Pause between item deletions, respecting platform rate limits.
    pub throttle_ms: u64,

    /// Delay before workspace destruction so the final summary stays
    /// readable for a moment.
    pub teardown_grace_secs: u64,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            confirm_timeout_secs: 30,
            throttle_ms: 500,
            teardown_grace_secs: 5,
        }
    }
}

impl PurgeConfig {
    pub fn confirm_deadline(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn teardown_grace(&self) -> Duration {
        Duration::from_secs(self.teardown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PurgeConfig::default();
        assert_eq!(config.confirm_deadline(), Duration::from_secs(30));
        assert_eq!(config.throttle(), Duration::from_millis(500));
        assert_eq!(config.teardown_grace(), Duration::from_secs(5));
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = r"
confirm_timeout_secs: 10
";
        let config: PurgeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.confirm_timeout_secs, 10);
        assert_eq!(config.throttle_ms, 500);
        assert_eq!(config.teardown_grace_secs, 5);
    }

    #[test]
    fn empty_yaml_deserializes_to_defaults() {
        let config: PurgeConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.confirm_timeout_secs, 30);
    }
}
