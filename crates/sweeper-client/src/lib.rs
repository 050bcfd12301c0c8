//! # sweeper-client
//!
//! Typed reqwest wrapper over the platform's user-account HTTP API:
//! one probe call, two listings, and per-item deletion.
//!
//! The failure policy of the [`ResourceClient`](sweeper_proto::ResourceClient)
//! seam is enforced here: every network or API failure is logged and
//! converted into the infallible outcome types, so nothing
//! network-shaped ever reaches the purge state machine.

mod api;
mod config;
mod error;
mod types;

pub use api::PlatformClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
