//! # sweeper-core
//!
//! Core purge workflow for Sweeper.
//!
//! This crate provides:
//! - The [`PurgeRun`] state machine driving one cleanup end to end
//! - The process-wide [`SessionRegistry`] enforcing one run per principal
//! - The confirmation gate bounding destructive work behind a reply
//! - The [`ProgressReporter`] editing one live status message in place
//! - Run configuration with YAML-loadable defaults

mod config;
mod confirm;
mod progress;
mod registry;
mod run;

pub use config::PurgeConfig;
pub use confirm::{ACK_TOKEN, Confirmation, await_confirmation};
pub use progress::{
    ProgressReporter, format_enumeration, format_failure, format_nothing_to_do, format_progress,
    format_summary,
};
pub use registry::{RegistryError, SessionEntry, SessionGuard, SessionRegistry};
pub use run::{PurgeCounts, PurgeError, PurgeRun, PurgeTotals, RunOutcome, RunPhase, RunReport};
