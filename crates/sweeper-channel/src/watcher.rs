//! The cancel watcher.
//!
//! One task per workspace, started when a status message first carries
//! the cancel affordance. It polls the workspace for a `cancel` message,
//! latches the run's flag when the owner sends one, and turns anyone
//! else away. The run itself never blocks on this task; cancellation is
//! observed at the deletion loop's iteration boundaries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use sweeper_proto::CancelControl;

use crate::http::BotHttp;

/// The message that activates the cancel affordance.
pub(crate) fn is_cancel_message(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("cancel")
}

pub(crate) fn spawn(
    http: BotHttp,
    channel_id: String,
    start_after: String,
    control: CancelControl,
    poll_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut cursor = start_after;
        loop {
            if control.is_activated() {
                return;
            }
            match http.fetch_messages_after(&channel_id, &cursor).await {
                Ok(messages) => {
                    for message in messages {
                        cursor = message.id.clone();
                        if !is_cancel_message(&message.content) {
                            continue;
                        }
                        match control.activate(message.author) {
                            Ok(()) => {
                                info!(channel = %channel_id, "cancel requested by run owner");
                                let _ = http
                                    .post_message(
                                        &channel_id,
                                        "⏹ Stopping after the current item...",
                                    )
                                    .await;
                                return;
                            }
                            Err(_) => {
                                debug!(
                                    channel = %channel_id,
                                    author = %message.author,
                                    "cancel attempt from non-owner rejected"
                                );
                                let _ = http
                                    .post_message(
                                        &channel_id,
                                        "Only the user who started this run can stop it.",
                                    )
                                    .await;
                            }
                        }
                    }
                }
                // Transient poll failures are retried on the next tick.
                Err(err) => debug!(error = %err, "cancel watcher poll failed"),
            }
            tokio::time::sleep(poll_interval).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_matching_trims_and_ignores_case() {
        assert!(is_cancel_message("cancel"));
        assert!(is_cancel_message("  CANCEL \n"));
        assert!(is_cancel_message("Cancel"));
    }

    #[test]
    fn near_misses_do_not_cancel() {
        assert!(!is_cancel_message("cancelled"));
        assert!(!is_cancel_message("please cancel"));
        assert!(!is_cancel_message("confirm"));
    }
}
