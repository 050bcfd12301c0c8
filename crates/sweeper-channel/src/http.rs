use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sweeper_proto::{ChannelError, ChannelResult, IncomingMessage, PrincipalId};

/// Permission bit allowing a member to see a channel.
const VIEW_CHANNEL: u64 = 1 << 10;
/// Permission bit allowing a member to send messages.
const SEND_MESSAGES: u64 = 1 << 11;
/// Channel type discriminator for a guild text channel.
const GUILD_TEXT: u8 = 0;

#[derive(Serialize)]
struct OverwriteDto {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
    allow: String,
    deny: String,
}

#[derive(Serialize)]
struct CreateChannelRequest {
    name: String,
    #[serde(rename = "type")]
    kind: u8,
    permission_overwrites: Vec<OverwriteDto>,
}

#[derive(Serialize)]
struct MessagePayload {
    content: String,
}

#[derive(Deserialize)]
struct ChannelDto {
    id: String,
}

#[derive(Deserialize)]
struct UserDto {
    id: String,
}

#[derive(Deserialize)]
struct AuthorDto {
    id: String,
}

#[derive(Deserialize)]
struct MessageDto {
    id: String,
    author: AuthorDto,
    content: String,
}

/// Thin typed wrapper over the bot REST endpoints.
///
/// Cheap to clone; the watcher and the command daemon share it.
#[derive(Clone)]
pub struct BotHttp {
    client: Client,
    base_url: String,
    auth: String,
}

impl BotHttp {
    pub fn new(base_url: &str, bot_token: &str) -> ChannelResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ChannelError::Startup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            auth: format!("Bot {bot_token}"),
        })
    }

    /// The bot's own user id, from `GET /users/@me`.
    pub async fn identify(&self) -> ChannelResult<String> {
        let url = format!("{}/users/@me", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("authorization", &self.auth)
            .send()
            .await
            .map_err(|e| ChannelError::Startup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Startup(format!(
                "bot token rejected: {}",
                response.status()
            )));
        }

        let user: UserDto = response
            .json()
            .await
            .map_err(|e| ChannelError::Startup(e.to_string()))?;
        Ok(user.id)
    }

    /// Create a private text channel in `guild_id`, visible only to
    /// `principal` and the bot itself.
    pub async fn create_private_channel(
        &self,
        guild_id: &str,
        name: &str,
        principal: PrincipalId,
        bot_user_id: &str,
    ) -> ChannelResult<String> {
        let url = format!("{}/guilds/{}/channels", self.base_url, guild_id);
        let member_allow = (VIEW_CHANNEL | SEND_MESSAGES).to_string();
        let request = CreateChannelRequest {
            name: name.to_string(),
            kind: GUILD_TEXT,
            permission_overwrites: vec![
                // The @everyone role carries the guild's own id.
                OverwriteDto {
                    id: guild_id.to_string(),
                    kind: 0,
                    allow: "0".to_string(),
                    deny: VIEW_CHANNEL.to_string(),
                },
                OverwriteDto {
                    id: principal.to_string(),
                    kind: 1,
                    allow: member_allow.clone(),
                    deny: "0".to_string(),
                },
                OverwriteDto {
                    id: bot_user_id.to_string(),
                    kind: 1,
                    allow: member_allow,
                    deny: "0".to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .header("authorization", &self.auth)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChannelError::WorkspaceCreate(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::WorkspaceCreate(format!("{status} - {body}")));
        }

        let channel: ChannelDto = response
            .json()
            .await
            .map_err(|e| ChannelError::WorkspaceCreate(e.to_string()))?;
        debug!(channel = %channel.id, "private channel created");
        Ok(channel.id)
    }

    pub async fn delete_channel(&self, channel_id: &str) -> ChannelResult<()> {
        let url = format!("{}/channels/{}", self.base_url, channel_id);
        let response = self
            .client
            .delete(&url)
            .header("authorization", &self.auth)
            .send()
            .await
            .map_err(|e| ChannelError::WorkspaceDestroy {
                id: channel_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ChannelError::WorkspaceDestroy {
                id: channel_id.to_string(),
                reason: response.status().to_string(),
            });
        }
        Ok(())
    }

    /// Post a message, returning its id.
    pub async fn post_message(&self, channel_id: &str, content: &str) -> ChannelResult<String> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let response = self
            .client
            .post(&url)
            .header("authorization", &self.auth)
            .json(&MessagePayload {
                content: content.to_string(),
            })
            .send()
            .await
            .map_err(|e| ChannelError::Post(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::Post(format!("{status} - {body}")));
        }

        let message: MessageDto = response
            .json()
            .await
            .map_err(|e| ChannelError::Post(e.to_string()))?;
        Ok(message.id)
    }

    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> ChannelResult<()> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.base_url, channel_id, message_id
        );
        let response = self
            .client
            .patch(&url)
            .header("authorization", &self.auth)
            .json(&MessagePayload {
                content: content.to_string(),
            })
            .send()
            .await
            .map_err(|e| ChannelError::Edit(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Edit(response.status().to_string()));
        }
        Ok(())
    }

    pub async fn delete_message(&self, channel_id: &str, message_id: &str) -> ChannelResult<()> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.base_url, channel_id, message_id
        );
        let response = self
            .client
            .delete(&url)
            .header("authorization", &self.auth)
            .send()
            .await
            .map_err(|e| ChannelError::Delete(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Delete(response.status().to_string()));
        }
        Ok(())
    }

    /// Fetch messages strictly newer than `after`, oldest first.
    ///
    /// Messages whose author id is not a well-formed snowflake are
    /// dropped; they cannot be attributed to a principal.
    pub async fn fetch_messages_after(
        &self,
        channel_id: &str,
        after: &str,
    ) -> ChannelResult<Vec<IncomingMessage>> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let response = self
            .client
            .get(&url)
            .header("authorization", &self.auth)
            .query(&[("after", after), ("limit", "100")])
            .send()
            .await
            .map_err(|e| ChannelError::Receive(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Receive(response.status().to_string()));
        }

        let messages: Vec<MessageDto> = response
            .json()
            .await
            .map_err(|e| ChannelError::Receive(e.to_string()))?;

        Ok(incoming_oldest_first(messages))
    }
}

/// The API returns newest first; waits and watchers want oldest first.
fn incoming_oldest_first(messages: Vec<MessageDto>) -> Vec<IncomingMessage> {
    let mut incoming: Vec<(u64, IncomingMessage)> = messages
        .into_iter()
        .filter_map(|m| {
            let ordinal: u64 = m.id.parse().ok()?;
            let author: u64 = m.author.id.parse().ok()?;
            Some((
                ordinal,
                IncomingMessage {
                    id: m.id,
                    author: PrincipalId(author),
                    content: m.content,
                },
            ))
        })
        .collect();
    incoming.sort_by_key(|(ordinal, _)| *ordinal);
    incoming.into_iter().map(|(_, message)| message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, author: &str, content: &str) -> MessageDto {
        MessageDto {
            id: id.to_string(),
            author: AuthorDto {
                id: author.to_string(),
            },
            content: content.to_string(),
        }
    }

    #[test]
    fn messages_are_reordered_oldest_first() {
        let incoming = incoming_oldest_first(vec![
            message("30", "1", "third"),
            message("10", "1", "first"),
            message("20", "2", "second"),
        ]);
        let contents: Vec<_> = incoming.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(incoming[1].author, PrincipalId(2));
    }

    #[test]
    fn malformed_ids_are_dropped() {
        let incoming = incoming_oldest_first(vec![
            message("10", "not-a-number", "webhook"),
            message("oops", "1", "bad id"),
            message("20", "2", "kept"),
        ]);
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].content, "kept");
    }
}
