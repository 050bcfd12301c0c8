//! Process-wide tracking of in-flight runs, one per principal.
//!
//! The registry closes the lookup-then-insert race of a plain map:
//! claiming is a single check-and-insert under one lock, and the
//! returned guard releases the entry on drop, so an entry can never
//! outlive its run even when the run unwinds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use sweeper_proto::{PrincipalId, WorkspaceHandle};

/// Metadata recorded for one in-flight run.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Workspace bound to the run; `None` until allocation completes.
    pub workspace: Option<WorkspaceHandle>,

    /// When the run was claimed.
    pub started: DateTime<Utc>,
}

/// Errors that can occur when claiming a session.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The principal already has an in-flight run.
    #[error("a cleanup run started at {started} is already active for this user")]
    AlreadyRunning { started: DateTime<Utc> },
}

/// Map from invoking principal to their in-flight run.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<PrincipalId, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the principal's single run slot.
    ///
    /// Check and insert happen under one lock, so two concurrent claims
    /// for the same principal can never both succeed. The claim is made
    /// before any workspace exists; bind the workspace with
    /// [`bind_workspace`](SessionRegistry::bind_workspace) once allocated.
    pub fn claim(self: &Arc<Self>, principal: PrincipalId) -> Result<SessionGuard, RegistryError> {
        let mut table = self.table();
        if let Some(existing) = table.get(&principal) {
            return Err(RegistryError::AlreadyRunning {
                started: existing.started,
            });
        }
        table.insert(
            principal,
            SessionEntry {
                workspace: None,
                started: Utc::now(),
            },
        );
        drop(table);

        tracing::debug!(principal = %principal, "session claimed");
        Ok(SessionGuard {
            registry: Arc::clone(self),
            principal,
        })
    }

    /// Record the workspace allocated for the principal's run.
    pub fn bind_workspace(&self, principal: PrincipalId, workspace: &WorkspaceHandle) {
        if let Some(entry) = self.table().get_mut(&principal) {
            entry.workspace = Some(workspace.clone());
        }
    }

    /// Workspace of the principal's in-flight run, if any.
    ///
    /// Used by interleaved events (e.g. the cancel affordance) to find
    /// the run they belong to.
    pub fn workspace_for(&self, principal: PrincipalId) -> Option<WorkspaceHandle> {
        self.table().get(&principal).and_then(|e| e.workspace.clone())
    }

    /// Number of in-flight runs.
    pub fn active_count(&self) -> usize {
        self.table().len()
    }

    fn release(&self, principal: PrincipalId) {
        self.table().remove(&principal);
        tracing::debug!(principal = %principal, "session released");
    }

    fn table(&self) -> MutexGuard<'_, HashMap<PrincipalId, SessionEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds one principal's run slot. The slot is released when dropped.
#[derive(Debug)]
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    principal: PrincipalId,
}

impl SessionGuard {
    pub fn principal(&self) -> PrincipalId {
        self.principal
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.release(self.principal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_then_duplicate_is_rejected() {
        let registry = Arc::new(SessionRegistry::new());
        let _guard = registry.claim(PrincipalId(1)).unwrap();

        let second = registry.claim(PrincipalId(1));
        assert!(matches!(
            second,
            Err(RegistryError::AlreadyRunning { .. })
        ));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn distinct_principals_coexist() {
        let registry = Arc::new(SessionRegistry::new());
        let _a = registry.claim(PrincipalId(1)).unwrap();
        let _b = registry.claim(PrincipalId(2)).unwrap();
        assert_eq!(registry.active_count(), 2);
    }

    #[test]
    fn slot_is_released_on_drop() {
        let registry = Arc::new(SessionRegistry::new());
        {
            let _guard = registry.claim(PrincipalId(1)).unwrap();
            assert_eq!(registry.active_count(), 1);
        }
        assert_eq!(registry.active_count(), 0);
        assert!(registry.claim(PrincipalId(1)).is_ok());
    }

    #[test]
    fn slot_is_released_when_the_holder_panics() {
        let registry = Arc::new(SessionRegistry::new());
        let cloned = Arc::clone(&registry);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = cloned.claim(PrincipalId(1)).unwrap();
            panic!("run blew up");
        }));
        assert!(result.is_err());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn workspace_binding_is_visible_to_lookups() {
        let registry = Arc::new(SessionRegistry::new());
        let _guard = registry.claim(PrincipalId(1)).unwrap();
        assert_eq!(registry.workspace_for(PrincipalId(1)), None);

        let workspace = WorkspaceHandle::new("ws-9");
        registry.bind_workspace(PrincipalId(1), &workspace);
        assert_eq!(registry.workspace_for(PrincipalId(1)), Some(workspace));
    }

    #[test]
    fn concurrent_claims_for_one_principal_admit_exactly_one() {
        let registry = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry.claim(PrincipalId(1)).map(|guard| {
                    // Hold the slot long enough for every thread to race.
                    std::thread::sleep(std::time::Duration::from_millis(50));
                    drop(guard);
                })
            }));
        }
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(registry.active_count(), 0);
    }
}
