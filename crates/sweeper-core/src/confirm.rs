use std::time::Duration;

use sweeper_proto::{ChannelResult, ObserverChannel, PrincipalId, WorkspaceHandle};

/// The reply that arms the deletion phase.
pub const ACK_TOKEN: &str = "confirm";

/// Outcome of the confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The owner replied with the acknowledgment token.
    Confirmed,
    /// The owner replied with something else.
    Declined,
    /// The deadline elapsed without a reply from the owner.
    TimedOut,
}

/// Block until the owning principal replies in the run's workspace or
/// the deadline elapses.
///
/// The token is matched case-insensitively with surrounding whitespace
/// ignored. Messages from anyone but the owner never reach this function:
/// the channel ignores them without consuming the wait.
pub async fn await_confirmation(
    channel: &dyn ObserverChannel,
    workspace: &WorkspaceHandle,
    principal: PrincipalId,
    deadline: Duration,
) -> ChannelResult<Confirmation> {
    match channel.await_reply(workspace, principal, deadline).await? {
        Some(reply) if reply.content.trim().eq_ignore_ascii_case(ACK_TOKEN) => {
            Ok(Confirmation::Confirmed)
        }
        Some(_) => Ok(Confirmation::Declined),
        None => Ok(Confirmation::TimedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use sweeper_proto::{
        CancelControl, ChannelError, IncomingMessage, MessageHandle,
    };

    /// A channel that yields one scripted reply (or a timeout).
    struct ScriptedChannel {
        reply: Mutex<Option<IncomingMessage>>,
    }

    impl ScriptedChannel {
        fn replying(content: &str) -> Self {
            Self {
                reply: Mutex::new(Some(IncomingMessage {
                    id: "1".to_string(),
                    author: PrincipalId(1),
                    content: content.to_string(),
                })),
            }
        }

        fn silent() -> Self {
            Self {
                reply: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ObserverChannel for ScriptedChannel {
        async fn create_workspace(
            &self,
            _principal: PrincipalId,
        ) -> ChannelResult<WorkspaceHandle> {
            Err(ChannelError::WorkspaceCreate("not scripted".to_string()))
        }

        async fn destroy_workspace(&self, _workspace: &WorkspaceHandle) -> ChannelResult<()> {
            Ok(())
        }

        async fn post_message(
            &self,
            _workspace: &WorkspaceHandle,
            _text: &str,
            _control: Option<&CancelControl>,
        ) -> ChannelResult<MessageHandle> {
            Err(ChannelError::Post("not scripted".to_string()))
        }

        async fn edit_message(
            &self,
            _message: &MessageHandle,
            _text: &str,
            _control: Option<&CancelControl>,
        ) -> ChannelResult<()> {
            Ok(())
        }

        async fn await_reply(
            &self,
            _workspace: &WorkspaceHandle,
            _principal: PrincipalId,
            _deadline: Duration,
        ) -> ChannelResult<Option<IncomingMessage>> {
            Ok(self.reply.lock().unwrap().take())
        }
    }

    async fn gate(channel: &ScriptedChannel) -> Confirmation {
        await_confirmation(
            channel,
            &WorkspaceHandle::new("ws"),
            PrincipalId(1),
            Duration::from_secs(30),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn matching_reply_confirms() {
        let channel = ScriptedChannel::replying("confirm");
        assert_eq!(gate(&channel).await, Confirmation::Confirmed);
    }

    #[tokio::test]
    async fn match_is_case_insensitive_and_trims() {
        let channel = ScriptedChannel::replying("  CONFIRM \n");
        assert_eq!(gate(&channel).await, Confirmation::Confirmed);
    }

    #[tokio::test]
    async fn other_reply_declines() {
        let channel = ScriptedChannel::replying("no thanks");
        assert_eq!(gate(&channel).await, Confirmation::Declined);
    }

    #[tokio::test]
    async fn near_miss_still_declines() {
        let channel = ScriptedChannel::replying("confirmed");
        assert_eq!(gate(&channel).await, Confirmation::Declined);
    }

    #[tokio::test]
    async fn silence_times_out() {
        let channel = ScriptedChannel::silent();
        assert_eq!(gate(&channel).await, Confirmation::TimedOut);
    }
}
