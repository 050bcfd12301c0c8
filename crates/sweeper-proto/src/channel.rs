use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::cancel::CancelControl;
use crate::ids::{MessageHandle, PrincipalId, WorkspaceHandle};

/// Result type alias for Observer Channel operations.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;

/// Errors that can occur on the Observer Channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Failed to start the channel transport (missing token, auth, ...).
    #[error("failed to start channel transport: {0}")]
    Startup(String),

    /// Failed to allocate the scratch workspace.
    #[error("failed to create workspace: {0}")]
    WorkspaceCreate(String),

    /// Failed to destroy the scratch workspace.
    #[error("failed to destroy workspace {id}: {reason}")]
    WorkspaceDestroy { id: String, reason: String },

    /// Failed to post a message.
    #[error("failed to post message: {0}")]
    Post(String),

    /// Failed to edit an existing message.
    #[error("failed to edit message: {0}")]
    Edit(String),

    /// Failed to delete a message.
    #[error("failed to delete message: {0}")]
    Delete(String),

    /// Failed to receive messages.
    #[error("failed to receive messages: {0}")]
    Receive(String),
}

/// A message received from the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: String,
    pub author: PrincipalId,
    pub content: String,
}

/// The chat transport as seen by the purge workflow.
///
/// Production code uses the REST adapter in `sweeper-channel`; tests
/// provide fake implementations.
#[async_trait]
pub trait ObserverChannel: Send + Sync {
    /// Allocate an ephemeral workspace visible only to `principal` and
    /// the orchestrator.
    async fn create_workspace(&self, principal: PrincipalId) -> ChannelResult<WorkspaceHandle>;

    /// Destroy a workspace previously created by [`create_workspace`].
    ///
    /// [`create_workspace`]: ObserverChannel::create_workspace
    async fn destroy_workspace(&self, workspace: &WorkspaceHandle) -> ChannelResult<()>;

    /// Post a message, optionally carrying the run's cancel affordance.
    ///
    /// Returns a handle that can be edited in place later.
    async fn post_message(
        &self,
        workspace: &WorkspaceHandle,
        text: &str,
        control: Option<&CancelControl>,
    ) -> ChannelResult<MessageHandle>;

    /// Replace the content of a previously posted message.
    ///
    /// Passing `None` for `control` removes the cancel affordance.
    async fn edit_message(
        &self,
        message: &MessageHandle,
        text: &str,
        control: Option<&CancelControl>,
    ) -> ChannelResult<()>;

    /// Wait for the next message from `principal` in `workspace`.
    ///
    /// Resolves to `None` once `deadline` elapses. Messages from other
    /// principals are ignored and do not consume the wait.
    async fn await_reply(
        &self,
        workspace: &WorkspaceHandle,
        principal: PrincipalId,
        deadline: Duration,
    ) -> ChannelResult<Option<IncomingMessage>>;
}
