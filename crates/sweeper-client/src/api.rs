use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use sweeper_proto::{Credential, DeleteOutcome, Liveness, ResourceClient, ResourceItem};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::{ChannelDto, RelationshipDto, connections_from, conversations_from};

/// Reqwest-backed implementation of the user-account API.
///
/// Each call is one best-effort round trip authorized by the per-call
/// credential; there are no retries and nothing is cached.
pub struct PlatformClient {
    client: Client,
    config: ClientConfig,
}

impl PlatformClient {
    /// Create a new client with configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    async fn fetch_relationships(&self, credential: &Credential) -> Result<Vec<ResourceItem>> {
        let url = format!("{}/users/@me/relationships", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", credential.expose())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(format!(
                "failed to list relationships: {} - {}",
                status, body
            )));
        }

        let relationships: Vec<RelationshipDto> = response.json().await?;
        debug!("found {} relationships", relationships.len());

        Ok(connections_from(relationships))
    }

    async fn fetch_conversations(&self, credential: &Credential) -> Result<Vec<ResourceItem>> {
        let url = format!("{}/users/@me/channels", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", credential.expose())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api(format!(
                "failed to list channels: {} - {}",
                status, body
            )));
        }

        let channels: Vec<ChannelDto> = response.json().await?;
        debug!("found {} channels before filtering", channels.len());

        Ok(conversations_from(channels))
    }
}

#[async_trait]
impl ResourceClient for PlatformClient {
    async fn probe(&self, credential: &Credential) -> Liveness {
        let url = format!("{}/users/@me", self.config.base_url);

        match self
            .client
            .get(&url)
            .header("authorization", credential.expose())
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Liveness::Alive,
            Ok(response) => {
                debug!(status = %response.status(), credential = %credential.masked(), "probe rejected");
                Liveness::Invalid
            }
            Err(err) => {
                warn!(error = %err, "probe request failed");
                Liveness::Invalid
            }
        }
    }

    async fn list_connections(&self, credential: &Credential) -> Vec<ResourceItem> {
        match self.fetch_relationships(credential).await {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "listing connections failed, treating as empty");
                Vec::new()
            }
        }
    }

    async fn list_conversations(&self, credential: &Credential) -> Vec<ResourceItem> {
        match self.fetch_conversations(credential).await {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "listing conversations failed, treating as empty");
                Vec::new()
            }
        }
    }

    async fn delete_item(&self, item: &ResourceItem, credential: &Credential) -> DeleteOutcome {
        // The platform signals the two deletions differently: removing a
        // relationship answers 204, closing a channel answers 200.
        let (url, expected) = match item {
            ResourceItem::Connection { id } => (
                format!("{}/users/@me/relationships/{}", self.config.base_url, id),
                StatusCode::NO_CONTENT,
            ),
            ResourceItem::Conversation { id } => (
                format!("{}/channels/{}", self.config.base_url, id),
                StatusCode::OK,
            ),
        };

        match self
            .client
            .delete(&url)
            .header("authorization", credential.expose())
            .send()
            .await
        {
            Ok(response) if response.status() == expected => DeleteOutcome::Deleted,
            Ok(response) => {
                debug!(
                    status = %response.status(),
                    kind = %item.kind(),
                    id = item.id(),
                    "deletion refused"
                );
                DeleteOutcome::Failed
            }
            Err(err) => {
                warn!(error = %err, kind = %item.kind(), id = item.id(), "deletion request failed");
                DeleteOutcome::Failed
            }
        }
    }
}
