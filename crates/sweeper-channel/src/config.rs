use std::env;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use sweeper_proto::{ChannelError, ChannelResult};

/// Transport settings for the bot side of the platform API.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Base URL of the platform API.
    pub base_url: String,

    /// Guild the bot operates in; scratch channels are created here.
    pub guild_id: String,

    /// Bot token. Usually left empty in the config file and resolved
    /// from `SWEEPER_BOT_TOKEN` via [`with_env_token`](Self::with_env_token).
    pub bot_token: String,

    /// Pause between message polls.
    pub poll_interval_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://discord.com/api/v9".to_string(),
            guild_id: String::new(),
            bot_token: String::new(),
            poll_interval_ms: 2000,
        }
    }
}

impl ChannelConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Resolve the bot token from the environment when the config file
    /// left it empty.
    pub fn with_env_token(mut self) -> ChannelResult<Self> {
        if self.bot_token.is_empty() {
            // Load .env if present; ignore if it doesn't exist
            let _ = dotenvy::dotenv();
            self.bot_token = env::var("SWEEPER_BOT_TOKEN").map_err(|_| {
                ChannelError::Startup(
                    "bot token not found: set SWEEPER_BOT_TOKEN or configure bot.bot_token"
                        .to_string(),
                )
            })?;
        }
        Ok(self)
    }

    /// The bot token, masked for logging.
    pub fn bot_token_masked(&self) -> String {
        if self.bot_token.len() > 8 {
            format!(
                "{}...{}",
                &self.bot_token[..4],
                &self.bot_token[self.bot_token.len() - 4..]
            )
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("base_url", &self.base_url)
            .field("guild_id", &self.guild_id)
            .field("bot_token", &self.bot_token_masked())
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_masks_the_token() {
        let config = ChannelConfig {
            bot_token: "abcd1234efgh5678".to_string(),
            ..ChannelConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("abcd...5678"));
        assert!(!debug.contains("1234efgh"));
    }

    #[test]
    fn explicit_token_is_kept() {
        let config = ChannelConfig {
            bot_token: "already-set".to_string(),
            ..ChannelConfig::default()
        };
        let resolved = config.with_env_token().unwrap();
        assert_eq!(resolved.bot_token, "already-set");
    }

    #[test]
    fn poll_interval_converts() {
        let config = ChannelConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
    }
}
