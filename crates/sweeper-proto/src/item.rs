use std::fmt;

use serde::{Deserialize, Serialize};

/// One deletable remote object.
///
/// Produced by enumeration, consumed (and discarded) by deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceItem {
    /// A social connection (friendship) on the remote account.
    Connection { id: String },
    /// A private conversation channel owned by the remote account.
    Conversation { id: String },
}

impl ResourceItem {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceItem::Connection { .. } => ResourceKind::Connection,
            ResourceItem::Conversation { .. } => ResourceKind::Conversation,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ResourceItem::Connection { id } | ResourceItem::Conversation { id } => id,
        }
    }
}

/// The two deletable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Connection,
    Conversation,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Connection => write!(f, "connection"),
            ResourceKind::Conversation => write!(f, "conversation"),
        }
    }
}

/// Result of the single credential probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Invalid,
}

/// Result of one deletion call.
///
/// Failure is data, not an error: the client converts every network or
/// API failure to `Failed` and the orchestrator counts and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed,
}
