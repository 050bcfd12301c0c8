use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use sweeper_channel::ChannelConfig;
use sweeper_client::ClientConfig;
use sweeper_core::PurgeConfig;

/// Everything the daemon needs, from one YAML file.
///
/// Every section and every field has a default, so a missing file or a
/// partial one is fine. The bot token is the exception: it is a secret
/// and comes from `SWEEPER_BOT_TOKEN` unless explicitly configured.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    pub purge: PurgeConfig,
    pub platform: ClientConfig,
    pub bot: BotSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BotSection {
    #[serde(flatten)]
    pub channel: ChannelConfig,

    /// Channel the daemon watches for `!purge` commands.
    pub command_channel_id: String,
}

impl SweeperConfig {
    /// Load from `path`, falling back to defaults when the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Check the fields the daemon cannot run without.
    pub fn validate_for_run(&self) -> Result<()> {
        if self.bot.channel.guild_id.is_empty() {
            bail!("bot.guild_id is not configured");
        }
        if self.bot.command_channel_id.is_empty() {
            bail!("bot.command_channel_id is not configured");
        }
        Ok(())
    }
}
