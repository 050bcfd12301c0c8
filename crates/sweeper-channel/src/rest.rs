use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use sweeper_proto::{
    CancelControl, ChannelResult, IncomingMessage, MessageHandle, ObserverChannel, PrincipalId,
    WorkspaceHandle,
};

use crate::config::ChannelConfig;
use crate::http::BotHttp;
use crate::watcher;

/// Append the cancel affordance to a status text.
pub fn with_cancel_hint(text: &str) -> String {
    format!("{text}\n\n🛑 Send `cancel` to stop.")
}

/// REST-polling [`ObserverChannel`] implementation.
pub struct RestChannel {
    http: BotHttp,
    config: ChannelConfig,
    bot_user_id: String,
    /// Per-workspace id of the newest message posted by the bot; waits
    /// and watchers only look at messages after it.
    cursors: Mutex<HashMap<String, String>>,
    watchers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl RestChannel {
    /// Validate the bot token and build the channel.
    pub async fn connect(config: ChannelConfig) -> ChannelResult<Self> {
        let http = BotHttp::new(&config.base_url, &config.bot_token)?;
        let bot_user_id = http.identify().await?;
        info!(bot_user_id = %bot_user_id, token = %config.bot_token_masked(), "bot authenticated");

        Ok(Self {
            http,
            config,
            bot_user_id,
            cursors: Mutex::new(HashMap::new()),
            watchers: Mutex::new(HashMap::new()),
        })
    }

    pub fn http(&self) -> &BotHttp {
        &self.http
    }

    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    fn cursor(&self, workspace_id: &str) -> String {
        self.cursors_table()
            .get(workspace_id)
            .cloned()
            .unwrap_or_else(|| "0".to_string())
    }

    fn advance_cursor(&self, workspace_id: &str, message_id: &str) {
        self.cursors_table()
            .insert(workspace_id.to_string(), message_id.to_string());
    }

    /// Start the cancel watcher for a workspace, once.
    fn ensure_watcher(&self, workspace_id: &str, control: &CancelControl) {
        let mut watchers = self.watchers_table();
        if watchers.contains_key(workspace_id) {
            return;
        }
        let handle = watcher::spawn(
            self.http.clone(),
            workspace_id.to_string(),
            self.cursor(workspace_id),
            control.clone(),
            self.config.poll_interval(),
        );
        watchers.insert(workspace_id.to_string(), handle);
    }

    fn cursors_table(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.cursors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn watchers_table(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.watchers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RestChannel {
    fn drop(&mut self) {
        for (_, handle) in self.watchers_table().drain() {
            handle.abort();
        }
    }
}

#[async_trait]
impl ObserverChannel for RestChannel {
    async fn create_workspace(&self, principal: PrincipalId) -> ChannelResult<WorkspaceHandle> {
        let name = format!("sweep-{principal}");
        let channel_id = self
            .http
            .create_private_channel(&self.config.guild_id, &name, principal, &self.bot_user_id)
            .await?;
        Ok(WorkspaceHandle::new(channel_id))
    }

    async fn destroy_workspace(&self, workspace: &WorkspaceHandle) -> ChannelResult<()> {
        if let Some(handle) = self.watchers_table().remove(workspace.id()) {
            handle.abort();
        }
        self.cursors_table().remove(workspace.id());
        self.http.delete_channel(workspace.id()).await
    }

    async fn post_message(
        &self,
        workspace: &WorkspaceHandle,
        text: &str,
        control: Option<&CancelControl>,
    ) -> ChannelResult<MessageHandle> {
        let content = match control {
            Some(_) => with_cancel_hint(text),
            None => text.to_string(),
        };
        let message_id = self.http.post_message(workspace.id(), &content).await?;
        self.advance_cursor(workspace.id(), &message_id);
        if let Some(control) = control {
            self.ensure_watcher(workspace.id(), control);
        }
        Ok(MessageHandle::new(workspace.id(), message_id))
    }

    async fn edit_message(
        &self,
        message: &MessageHandle,
        text: &str,
        control: Option<&CancelControl>,
    ) -> ChannelResult<()> {
        let content = match control {
            Some(_) => with_cancel_hint(text),
            None => text.to_string(),
        };
        self.http
            .edit_message(&message.channel_id, &message.message_id, &content)
            .await?;
        if let Some(control) = control {
            self.ensure_watcher(&message.channel_id, control);
        }
        Ok(())
    }

    async fn await_reply(
        &self,
        workspace: &WorkspaceHandle,
        principal: PrincipalId,
        deadline: Duration,
    ) -> ChannelResult<Option<IncomingMessage>> {
        let mut cursor = self.cursor(workspace.id());
        let poll_interval = self.config.poll_interval();

        let wait = async {
            loop {
                match self.http.fetch_messages_after(workspace.id(), &cursor).await {
                    Ok(messages) => {
                        for message in messages {
                            cursor = message.id.clone();
                            if message.author == principal {
                                return message;
                            }
                            // Everyone else (the bot included) is
                            // ignored without consuming the wait.
                            debug!(author = %message.author, "ignoring reply from non-owner");
                        }
                    }
                    Err(err) => warn!(error = %err, "reply poll failed, retrying"),
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        // One-shot deadline racing the wait; the loser is discarded.
        match tokio::time::timeout(deadline, wait).await {
            Ok(message) => Ok(Some(message)),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_hint_is_appended() {
        let text = with_cancel_hint("Progress: 1/3");
        assert!(text.starts_with("Progress: 1/3"));
        assert!(text.contains("Send `cancel` to stop"));
    }
}
