//! The bot daemon.
//!
//! Long-polls the configured command channel and turns `!purge` messages
//! into purge runs. Each run lives on its own task; the daemon keeps
//! polling so `!status` and runs for other principals stay responsive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use sweeper_channel::RestChannel;
use sweeper_client::PlatformClient;
use sweeper_core::{PurgeRun, RunOutcome, RunReport, SessionRegistry};
use sweeper_proto::{Credential, ObserverChannel, PrincipalId, ResourceClient};

use crate::commands::{BotCommand, parse_command};
use crate::config::SweeperConfig;

/// One-line outcome note posted back to the command channel.
fn summarize(principal: PrincipalId, report: &RunReport) -> String {
    match &report.outcome {
        RunOutcome::Completed => format!(
            "<@{principal}> cleanup complete: {} connections and {} conversations removed.",
            report.counts.deleted_connections, report.counts.deleted_conversations
        ),
        RunOutcome::Cancelled => {
            format!("<@{principal}> cleanup ended without any deletions.")
        }
        RunOutcome::Failed(reason) => format!("<@{principal}> cleanup failed: {reason}"),
    }
}

pub async fn run(config: SweeperConfig) -> anyhow::Result<()> {
    config.validate_for_run()?;

    let channel_config = config.bot.channel.clone().with_env_token()?;
    let poll_interval = channel_config.poll_interval();
    let channel = Arc::new(RestChannel::connect(channel_config).await?);
    let client = Arc::new(PlatformClient::new(config.platform.clone())?);
    let registry = Arc::new(SessionRegistry::new());

    let http = channel.http().clone();
    let command_channel = config.bot.command_channel_id.clone();

    // Install signal handler for graceful shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            flag.store(true, Ordering::Relaxed);
        });
    }

    // The greeting doubles as the polling cursor: only messages after
    // it are ever considered.
    let mut cursor = http
        .post_message(
            &command_channel,
            "🧹 Sweeper online - `!purge <token>` to start a cleanup.",
        )
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "greeting failed, starting from the channel head");
            "0".to_string()
        });

    info!(command_channel = %command_channel, "daemon ready");

    while !shutdown.load(Ordering::Relaxed) {
        let messages = match http.fetch_messages_after(&command_channel, &cursor).await {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, "command poll failed, retrying");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for message in messages {
            cursor = message.id.clone();

            // Skip our own traffic.
            if message.author.to_string() == channel.bot_user_id() {
                continue;
            }

            let Some(command) = parse_command(&message.content) else {
                continue;
            };

            match command {
                BotCommand::Purge { credential } => {
                    // The raw token must not linger in the channel.
                    if let Err(err) = http.delete_message(&command_channel, &message.id).await {
                        warn!(error = %err, "could not delete the command message");
                    }

                    let principal = message.author;
                    info!(principal = %principal, "purge requested");

                    let run = PurgeRun::new(
                        principal,
                        Credential::new(credential),
                        Arc::clone(&channel) as Arc<dyn ObserverChannel>,
                        Arc::clone(&client) as Arc<dyn ResourceClient>,
                        Arc::clone(&registry),
                        config.purge.clone(),
                    );

                    let http = http.clone();
                    let command_channel = command_channel.clone();
                    let registry = Arc::clone(&registry);
                    tokio::spawn(async move {
                        let note = match run.execute().await {
                            Ok(report) => summarize(principal, &report),
                            // Point a rejected duplicate at its live run.
                            Err(err) => match registry.workspace_for(principal) {
                                Some(workspace) => {
                                    format!("<@{principal}> {err} - see <#{workspace}>")
                                }
                                None => format!("<@{principal}> {err}"),
                            },
                        };
                        let _ = http.post_message(&command_channel, &note).await;
                    });
                }
                BotCommand::PurgeMissingToken => {
                    let _ = http
                        .post_message(&command_channel, "Usage: `!purge <token>`")
                        .await;
                }
                BotCommand::Status => {
                    let text = format!("{} active run(s).", registry.active_count());
                    let _ = http.post_message(&command_channel, &text).await;
                }
                BotCommand::Unknown => {
                    let _ = http
                        .post_message(
                            &command_channel,
                            "Unknown command. Try `!purge <token>` or `!status`.",
                        )
                        .await;
                }
            }
        }

        tokio::time::sleep(poll_interval).await;
    }

    // Farewell
    let _ = http.post_message(&command_channel, "🧹 Sweeper offline 👋").await;

    Ok(())
}
