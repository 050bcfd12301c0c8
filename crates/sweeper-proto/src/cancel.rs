use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::ids::PrincipalId;

/// Single-writer, many-reader cancellation latch scoped to one run.
///
/// Transitions false→true exactly once and never reverts. The deletion
/// loop polls it between iterations; in-flight requests always finish.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the flag. Idempotent.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Attempted cancellation by a principal that does not own the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("only the user who started this run can stop it")]
pub struct NotRunOwner;

/// Owner-checked handle to a run's [`CancelFlag`].
///
/// Passed to the Observer Channel alongside status messages so the
/// transport can expose a cancel affordance without knowing anything
/// about the workflow behind it.
#[derive(Debug, Clone)]
pub struct CancelControl {
    owner: PrincipalId,
    flag: CancelFlag,
}

impl CancelControl {
    pub fn new(owner: PrincipalId, flag: CancelFlag) -> Self {
        Self { owner, flag }
    }

    pub fn owner(&self) -> PrincipalId {
        self.owner
    }

    pub fn is_activated(&self) -> bool {
        self.flag.is_set()
    }

    /// Latch the flag on behalf of `by`.
    ///
    /// Rejected without any state change unless `by` owns the run.
    pub fn activate(&self, by: PrincipalId) -> Result<(), NotRunOwner> {
        if by != self.owner {
            return Err(NotRunOwner);
        }
        self.flag.set();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_latches_and_never_reverts() {
        let flag = CancelFlag::new();
        assert!(!flag.is_set());
        flag.set();
        assert!(flag.is_set());
        flag.set();
        assert!(flag.is_set());
    }

    #[test]
    fn clones_share_the_latch() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        flag.set();
        assert!(observer.is_set());
    }

    #[test]
    fn owner_activation_sets_the_flag() {
        let flag = CancelFlag::new();
        let control = CancelControl::new(PrincipalId(7), flag.clone());
        control.activate(PrincipalId(7)).unwrap();
        assert!(flag.is_set());
        assert!(control.is_activated());
    }

    #[test]
    fn foreign_activation_is_rejected_without_state_change() {
        let flag = CancelFlag::new();
        let control = CancelControl::new(PrincipalId(7), flag.clone());
        assert_eq!(control.activate(PrincipalId(8)), Err(NotRunOwner));
        assert!(!flag.is_set());
    }
}
