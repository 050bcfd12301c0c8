use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token for the account being cleaned up.
///
/// Authorizes every [`ResourceClient`](crate::ResourceClient) call for one
/// run and is dropped with the run; it is never serialized or persisted.
/// `Debug` output is redacted so the token cannot leak into logs.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token, for building an authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A loggable form showing only the first and last four characters.
    pub fn masked(&self) -> String {
        if self.0.len() > 8 {
            format!("{}...{}", &self.0[..4], &self.0[self.0.len() - 4..])
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

/// Identity of the user a run executes on behalf of.
///
/// The principal owns the run's confirmation and cancellation rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub u64);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to the ephemeral scratch channel created for one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceHandle {
    id: String,
}

impl WorkspaceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for WorkspaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Address of a single message, sufficient to edit it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageHandle {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}
