use async_trait::async_trait;

use crate::ids::Credential;
use crate::item::{DeleteOutcome, Liveness, ResourceItem};

/// Thin typed view of the remote platform's user-account API.
///
/// Every method is a single best-effort round trip with the failure
/// policy baked into the return type: probes that fail are `Invalid`,
/// listings that fail are empty, deletions that fail are `Failed`.
/// Nothing here returns an error, so nothing network-shaped can escape
/// into the orchestrator's state machine.
///
/// Credentials are passed per call and never cached beyond the run.
/// Calls are never made concurrently for the same credential; the
/// orchestrator is single-flight per run.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// One round trip confirming the credential is usable.
    async fn probe(&self, credential: &Credential) -> Liveness;

    /// Enumerate the account's social connections, in platform order.
    async fn list_connections(&self, credential: &Credential) -> Vec<ResourceItem>;

    /// Enumerate the account's private conversation channels.
    async fn list_conversations(&self, credential: &Credential) -> Vec<ResourceItem>;

    /// Attempt to delete one item.
    async fn delete_item(&self, item: &ResourceItem, credential: &Credential) -> DeleteOutcome;
}
