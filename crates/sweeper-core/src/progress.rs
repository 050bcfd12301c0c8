//! Live status rendering for one run.
//!
//! All output goes through a single status message edited in place, so
//! the workspace never floods. Rendering is split into pure `format_*`
//! functions; [`ProgressReporter`] owns the message handle and the
//! inter-item throttle.

use std::sync::Arc;
use std::time::Duration;

use sweeper_proto::{
    CancelControl, ChannelResult, MessageHandle, ObserverChannel, ResourceKind,
};

use crate::run::{PurgeCounts, PurgeTotals};

/// Status text posted right after enumeration, asking for confirmation.
pub fn format_enumeration(totals: PurgeTotals, confirm_secs: u64) -> String {
    format!(
        "📊 Found:\n\
         - {} connections\n\
         - {} private conversations\n\n\
         💬 Reply `confirm` within {}s to start the cleanup.",
        totals.connections, totals.conversations, confirm_secs
    )
}

/// Running progress for the kind currently being deleted.
pub fn format_progress(kind: ResourceKind, counts: &PurgeCounts, totals: PurgeTotals) -> String {
    let (label, deleted, failed, total) = match kind {
        ResourceKind::Connection => (
            "connections",
            counts.deleted_connections,
            counts.failed_connections,
            totals.connections,
        ),
        ResourceKind::Conversation => (
            "conversations",
            counts.deleted_conversations,
            counts.failed_conversations,
            totals.conversations,
        ),
    };
    let processed = deleted + failed;
    format!(
        "🔄 Removing {label}...\n\
         Progress: {processed}/{total} ({:.1}%)\n\
         ✅ Removed: {deleted}\n\
         ❌ Failed: {failed}",
        percent(processed, total)
    )
}

/// Final immutable summary. Reports un-attempted items as skipped,
/// distinct from failed, when the run was stopped early.
pub fn format_summary(counts: &PurgeCounts, totals: PurgeTotals) -> String {
    let skipped_connections = totals.connections - counts.attempted(ResourceKind::Connection);
    let skipped_conversations = totals.conversations - counts.attempted(ResourceKind::Conversation);
    let stopped_early = skipped_connections + skipped_conversations > 0;

    let mut text = String::from(if stopped_early {
        "⏹ Cleanup stopped early.\n\n📊 Results:\n"
    } else {
        "✨ Cleanup finished!\n\n📊 Results:\n"
    });
    text.push_str(&format!(
        "👥 Connections: removed {}, failed {}\n",
        counts.deleted_connections, counts.failed_connections
    ));
    text.push_str(&format!(
        "💬 Conversations: removed {}, failed {}",
        counts.deleted_conversations, counts.failed_conversations
    ));
    if stopped_early {
        text.push_str(&format!(
            "\n⏭ Skipped: {skipped_connections} connections, {skipped_conversations} conversations"
        ));
    }
    text
}

/// Terminal text when the owner declined.
pub fn format_declined() -> String {
    "❌ Cleanup declined - nothing was removed.".to_string()
}

/// Terminal text when the confirmation deadline elapsed.
pub fn format_timed_out() -> String {
    "⏰ No confirmation within the deadline - nothing was removed.".to_string()
}

/// Terminal text for a run that hit an internal error.
pub fn format_failure(reason: &str) -> String {
    format!("❌ Cleanup aborted: {reason}")
}

/// Terminal text when enumeration found nothing at all.
pub fn format_nothing_to_do() -> String {
    "✨ Nothing to clean up - no connections or conversations found.".to_string()
}

fn percent(processed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(processed) / f64::from(total) * 100.0
    }
}

/// Edits the run's single status message and paces the deletion loop.
pub struct ProgressReporter {
    channel: Arc<dyn ObserverChannel>,
    status: MessageHandle,
    totals: PurgeTotals,
    throttle: Duration,
}

impl ProgressReporter {
    pub fn new(
        channel: Arc<dyn ObserverChannel>,
        status: MessageHandle,
        totals: PurgeTotals,
        throttle: Duration,
    ) -> Self {
        Self {
            channel,
            status,
            totals,
            throttle,
        }
    }

    /// Push one post-deletion snapshot, keeping the cancel affordance,
    /// then wait out the inter-item throttle.
    pub async fn report(
        &self,
        kind: ResourceKind,
        counts: &PurgeCounts,
        control: &CancelControl,
    ) -> ChannelResult<()> {
        let text = format_progress(kind, counts, self.totals);
        self.channel
            .edit_message(&self.status, &text, Some(control))
            .await?;
        tokio::time::sleep(self.throttle).await;
        Ok(())
    }

    /// Render the final summary and drop the cancel affordance.
    pub async fn finish(&self, counts: &PurgeCounts) -> ChannelResult<()> {
        self.channel
            .edit_message(&self.status, &format_summary(counts, self.totals), None)
            .await
    }

    /// Close out a declined run.
    pub async fn finish_declined(&self) -> ChannelResult<()> {
        self.channel
            .edit_message(&self.status, &format_declined(), None)
            .await
    }

    /// Close out a run whose confirmation deadline elapsed.
    pub async fn finish_timed_out(&self) -> ChannelResult<()> {
        self.channel
            .edit_message(&self.status, &format_timed_out(), None)
            .await
    }
}
