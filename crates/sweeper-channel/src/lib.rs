//! # sweeper-channel
//!
//! Observer Channel implementation over the platform's bot messaging
//! HTTP API.
//!
//! Everything here runs over plain REST with cursor-based polling; no
//! gateway connection is required:
//!
//! - **Workspace** — a private text channel created per run, visible
//!   only to the invoking user and the bot, deleted at teardown
//! - **Status** — one message per run, edited in place
//! - **Replies** — `await_reply` polls the workspace and ignores
//!   everyone but the owning principal
//! - **Cancel affordance** — a watcher task that latches the run's
//!   cancel flag on a `cancel` message from the owner and turns anyone
//!   else away
//!
//! ## Key Components
//!
//! - [`BotHttp`] — thin typed wrapper over the bot REST endpoints
//! - [`RestChannel`] — the [`ObserverChannel`](sweeper_proto::ObserverChannel) impl
//! - [`ChannelConfig`] — token, guild, and polling knobs

mod config;
mod http;
mod rest;
mod watcher;

pub use config::ChannelConfig;
pub use http::BotHttp;
pub use rest::{RestChannel, with_cancel_hint};
