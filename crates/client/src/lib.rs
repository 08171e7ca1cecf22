//! Tiffinbox client engine.
//!
//! The client keeps the cart in three places: an in-memory reactive store
//! (what the UI renders), a durable cache (what survives restarts), and the
//! server (authoritative once logged in). This crate is the machinery that
//! keeps the three consistent: an observable store, a tolerant durable
//! cache, a single-slot stash for the action that triggered a login, the
//! optimistic/pessimistic mutators, and the reconciliation engine that
//! decides which copy wins.
//!
//! Execution is single-threaded cooperative async; nothing here is
//! cancellable, and timeouts belong to the transport.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod mutator;
pub mod reconcile;
pub mod session;
pub mod stash;
pub mod store;

#[cfg(test)]
mod testutil;

pub use api::{ApiError, AuthApi, CartApi, HttpApi, LikeApi, LikeState};
pub use cache::{DurableCache, JsonFileCache, MemoryCache};
pub use mutator::{CartMutator, LikeMutator, Outcome};
pub use reconcile::ReconciliationEngine;
pub use session::Session;
pub use stash::PendingActionStash;
pub use store::{ReactiveCartStore, ReactiveLikeStore};
