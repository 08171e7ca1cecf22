//! Pending-action stash.
//!
//! When a guest tries to add to the cart, the action is stashed and the
//! user is sent to login. One slot only: a later unauthenticated add
//! overwrites an earlier one, so after login exactly the latest action is
//! replayed, once.

use tiffinbox_core::PendingCartAction;

use crate::cache::{DurableCache, keys};

/// Single-slot stash over the cache's session schema.
pub struct PendingActionStash<'a, C> {
    cache: &'a C,
}

impl<'a, C: DurableCache> PendingActionStash<'a, C> {
    /// Wrap a cache.
    #[must_use]
    pub const fn new(cache: &'a C) -> Self {
        Self { cache }
    }

    /// Store an action, replacing any previous one.
    pub fn save(&self, action: &PendingCartAction) {
        self.cache.set(keys::PENDING_ACTION, action);
    }

    /// Take the stashed action, leaving the slot empty. The second call
    /// after a save returns `None` - the drain happens at most once.
    pub fn take(&self) -> Option<PendingCartAction> {
        let action = self.cache.get(keys::PENDING_ACTION)?;
        self.cache.clear(keys::PENDING_ACTION);
        Some(action)
    }
}
