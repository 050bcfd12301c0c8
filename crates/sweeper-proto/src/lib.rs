//! # sweeper-proto
//!
//! Shared types, error definitions, and trait seams for Sweeper.
//!
//! This crate provides the foundational abstractions used across all
//! Sweeper crates:
//! - Identifier newtypes ([`PrincipalId`], [`WorkspaceHandle`], [`MessageHandle`])
//!   and the redacting [`Credential`] wrapper
//! - The [`ResourceItem`] union and the infallible outcome types
//! - The set-once [`CancelFlag`] latch and its owner-checked [`CancelControl`]
//! - The [`ObserverChannel`] and [`ResourceClient`] traits implemented by
//!   the transport adapters and by test fakes

mod cancel;
mod channel;
mod client;
mod ids;
mod item;

pub use cancel::{CancelControl, CancelFlag, NotRunOwner};
pub use channel::{ChannelError, ChannelResult, IncomingMessage, ObserverChannel};
pub use client::ResourceClient;
pub use ids::{Credential, MessageHandle, PrincipalId, WorkspaceHandle};
pub use item::{DeleteOutcome, Liveness, ResourceItem, ResourceKind};
