//! The purge state machine.
//!
//! One [`PurgeRun`] drives a single cleanup end to end: claim the
//! principal's run slot, allocate a scratch workspace, probe the
//! credential, enumerate, gate on confirmation, delete sequentially
//! with live progress, and tear the workspace down on every exit path.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sweeper_proto::{
    CancelControl, CancelFlag, ChannelError, Credential, DeleteOutcome, Liveness, ObserverChannel,
    PrincipalId, ResourceClient, ResourceItem, ResourceKind, WorkspaceHandle,
};

use crate::config::PurgeConfig;
use crate::confirm::{Confirmation, await_confirmation};
use crate::progress::{
    ProgressReporter, format_enumeration, format_failure, format_nothing_to_do,
};
use crate::registry::{RegistryError, SessionRegistry};

/// Lifecycle phase of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Created,
    WorkspaceReady,
    Probing,
    Enumerating,
    AwaitingConfirmation,
    DeletingConnections,
    DeletingConversations,
    Completed,
    Cancelled,
    Failed,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The deletion phase ran (possibly truncated by a cancel) or there
    /// was nothing to delete.
    Completed,
    /// The run ended before any deletion was attempted (declined or
    /// confirmation timed out).
    Cancelled,
    /// An internal error ended the run.
    Failed(String),
}

/// Per-kind deletion tallies. Monotone within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeCounts {
    pub deleted_connections: u32,
    pub failed_connections: u32,
    pub deleted_conversations: u32,
    pub failed_conversations: u32,
}

impl PurgeCounts {
    pub fn record(&mut self, kind: ResourceKind, outcome: DeleteOutcome) {
        match (kind, outcome) {
            (ResourceKind::Connection, DeleteOutcome::Deleted) => self.deleted_connections += 1,
            (ResourceKind::Connection, DeleteOutcome::Failed) => self.failed_connections += 1,
            (ResourceKind::Conversation, DeleteOutcome::Deleted) => self.deleted_conversations += 1,
            (ResourceKind::Conversation, DeleteOutcome::Failed) => self.failed_conversations += 1,
        }
    }

    /// Items of `kind` for which a deletion call was actually made.
    pub fn attempted(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Connection => self.deleted_connections + self.failed_connections,
            ResourceKind::Conversation => self.deleted_conversations + self.failed_conversations,
        }
    }
}

/// Enumerated totals, captured once before the deletion phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeTotals {
    pub connections: u32,
    pub conversations: u32,
}

impl PurgeTotals {
    pub fn is_empty(self) -> bool {
        self.connections == 0 && self.conversations == 0
    }
}

/// What a finished run reports back to its invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub counts: PurgeCounts,
    pub totals: PurgeTotals,
}

/// Errors that end a run (or reject it before it starts).
#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    /// The principal already has an in-flight run; the existing run is
    /// unaffected and no workspace was created for this one.
    #[error(transparent)]
    AlreadyRunning(#[from] RegistryError),

    /// The probe rejected the credential; no partial work was attempted.
    #[error("the platform rejected the provided credential")]
    CredentialRejected,

    /// The Observer Channel failed mid-run.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// One cleanup workflow instance.
pub struct PurgeRun {
    principal: PrincipalId,
    credential: Credential,
    channel: Arc<dyn ObserverChannel>,
    client: Arc<dyn ResourceClient>,
    registry: Arc<SessionRegistry>,
    config: PurgeConfig,
    cancel: CancelFlag,
    phase: RunPhase,
    counts: PurgeCounts,
    totals: PurgeTotals,
}

impl PurgeRun {
    pub fn new(
        principal: PrincipalId,
        credential: Credential,
        channel: Arc<dyn ObserverChannel>,
        client: Arc<dyn ResourceClient>,
        registry: Arc<SessionRegistry>,
        config: PurgeConfig,
    ) -> Self {
        Self {
            principal,
            credential,
            channel,
            client,
            registry,
            config,
            cancel: CancelFlag::new(),
            phase: RunPhase::Created,
            counts: PurgeCounts::default(),
            totals: PurgeTotals::default(),
        }
    }

    /// The run's cancellation latch.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Drive the run to a terminal state.
    ///
    /// Returns `Err` only for rejections that happen before a workspace
    /// exists ([`PurgeError::AlreadyRunning`], workspace allocation).
    /// Everything after that point is resolved internally: errors are
    /// reported into the workspace, mapped to [`RunOutcome::Failed`],
    /// and still followed by exactly one teardown.
    pub async fn execute(mut self) -> Result<RunReport, PurgeError> {
        // Claim the single-flight slot before any workspace exists, so a
        // duplicate invocation never allocates a second workspace.
        let guard = self.registry.claim(self.principal)?;

        let workspace = self.channel.create_workspace(self.principal).await?;
        self.registry.bind_workspace(self.principal, &workspace);
        self.set_phase(RunPhase::WorkspaceReady);
        info!(principal = %self.principal, workspace = %workspace, "workspace ready");

        let outcome = match self.drive(&workspace).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "run failed");
                let text = format_failure(&err.to_string());
                if let Err(post_err) = self.channel.post_message(&workspace, &text, None).await {
                    warn!(error = %post_err, "could not report the failure to the workspace");
                }
                RunOutcome::Failed(err.to_string())
            }
        };

        self.set_phase(match &outcome {
            RunOutcome::Completed => RunPhase::Completed,
            RunOutcome::Cancelled => RunPhase::Cancelled,
            RunOutcome::Failed(_) => RunPhase::Failed,
        });

        self.teardown(&workspace).await;
        drop(guard);

        info!(principal = %self.principal, outcome = ?outcome, "run finished");
        Ok(RunReport {
            outcome,
            counts: self.counts,
            totals: self.totals,
        })
    }

    async fn drive(&mut self, workspace: &WorkspaceHandle) -> Result<RunOutcome, PurgeError> {
        self.set_phase(RunPhase::Probing);
        if self.client.probe(&self.credential).await == Liveness::Invalid {
            return Err(PurgeError::CredentialRejected);
        }

        self.set_phase(RunPhase::Enumerating);
        let connections = self.client.list_connections(&self.credential).await;
        let conversations = self.client.list_conversations(&self.credential).await;
        self.totals = PurgeTotals {
            connections: connections.len() as u32,
            conversations: conversations.len() as u32,
        };
        info!(
            connections = self.totals.connections,
            conversations = self.totals.conversations,
            "enumeration complete"
        );

        if self.totals.is_empty() {
            self.channel
                .post_message(workspace, &format_nothing_to_do(), None)
                .await?;
            return Ok(RunOutcome::Completed);
        }

        let control = CancelControl::new(self.principal, self.cancel.clone());
        let status = self
            .channel
            .post_message(
                workspace,
                &format_enumeration(self.totals, self.config.confirm_timeout_secs),
                Some(&control),
            )
            .await?;
        let reporter = ProgressReporter::new(
            Arc::clone(&self.channel),
            status,
            self.totals,
            self.config.throttle(),
        );

        self.set_phase(RunPhase::AwaitingConfirmation);
        match await_confirmation(
            self.channel.as_ref(),
            workspace,
            self.principal,
            self.config.confirm_deadline(),
        )
        .await?
        {
            Confirmation::Confirmed => {}
            Confirmation::Declined => {
                reporter.finish_declined().await?;
                return Ok(RunOutcome::Cancelled);
            }
            Confirmation::TimedOut => {
                reporter.finish_timed_out().await?;
                return Ok(RunOutcome::Cancelled);
            }
        }

        // Connections strictly before conversations, enumeration order
        // preserved within each kind. A cancel observed in the first
        // loop also empties the second: the flag is checked per item.
        self.set_phase(RunPhase::DeletingConnections);
        self.delete_all(&reporter, &control, connections).await?;
        self.set_phase(RunPhase::DeletingConversations);
        self.delete_all(&reporter, &control, conversations).await?;

        reporter.finish(&self.counts).await?;
        Ok(RunOutcome::Completed)
    }

    /// Delete one enumerated collection, polling the cancel latch
    /// between iterations. The current item always finishes; remaining
    /// items are left un-attempted once the latch is observed.
    async fn delete_all(
        &mut self,
        reporter: &ProgressReporter,
        control: &CancelControl,
        items: Vec<ResourceItem>,
    ) -> Result<(), PurgeError> {
        for item in items {
            if self.cancel.is_set() {
                info!(phase = ?self.phase, "cancel observed, leaving remaining items un-attempted");
                return Ok(());
            }
            let outcome = self.client.delete_item(&item, &self.credential).await;
            if outcome == DeleteOutcome::Failed {
                debug!(kind = %item.kind(), id = item.id(), "deletion failed, continuing");
            }
            self.counts.record(item.kind(), outcome);
            reporter.report(item.kind(), &self.counts, control).await?;
        }
        Ok(())
    }

    /// Unconditional end-of-run cleanup: grace delay, then best-effort
    /// workspace destruction. Runs exactly once per run; the registry
    /// slot itself is released by the guard even if this unwinds.
    async fn teardown(&self, workspace: &WorkspaceHandle) {
        tokio::time::sleep(self.config.teardown_grace()).await;
        match self.channel.destroy_workspace(workspace).await {
            Ok(()) => debug!(workspace = %workspace, "workspace destroyed"),
            Err(err) => warn!(error = %err, workspace = %workspace, "workspace destruction failed"),
        }
    }

    fn set_phase(&mut self, phase: RunPhase) {
        debug!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_record_per_kind() {
        let mut counts = PurgeCounts::default();
        counts.record(ResourceKind::Connection, DeleteOutcome::Deleted);
        counts.record(ResourceKind::Connection, DeleteOutcome::Failed);
        counts.record(ResourceKind::Conversation, DeleteOutcome::Deleted);

        assert_eq!(counts.deleted_connections, 1);
        assert_eq!(counts.failed_connections, 1);
        assert_eq!(counts.deleted_conversations, 1);
        assert_eq!(counts.failed_conversations, 0);
        assert_eq!(counts.attempted(ResourceKind::Connection), 2);
        assert_eq!(counts.attempted(ResourceKind::Conversation), 1);
    }

    #[test]
    fn totals_emptiness() {
        assert!(PurgeTotals::default().is_empty());
        assert!(
            !PurgeTotals {
                connections: 0,
                conversations: 1
            }
            .is_empty()
        );
    }
}
