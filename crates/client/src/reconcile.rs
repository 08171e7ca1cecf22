//! Reconciliation engine.
//!
//! Decides which copy of the cart wins at the two moments it matters:
//!
//! - On load: the server, when there is a credential; the durable cache
//!   otherwise. Local-only edits in flight when an authenticated load runs
//!   are discarded - the server is authoritative.
//! - Right after login: the pending-action stash is drained (at most once)
//!   through the normal authenticated add path, then the merged server cart
//!   becomes local truth.

use tiffinbox_core::CartLine;

use crate::api::CartApi;
use crate::cache::{DurableCache, keys};
use crate::session::Session;
use crate::stash::PendingActionStash;
use crate::store::ReactiveCartStore;

/// Keeps the reactive store, the durable cache, and the server cart
/// consistent.
pub struct ReconciliationEngine<'a, A, C> {
    api: &'a A,
    cache: &'a C,
    store: &'a ReactiveCartStore,
}

impl<'a, A: CartApi, C: DurableCache> ReconciliationEngine<'a, A, C> {
    /// Wire an engine over the shared store, cache, and transport.
    #[must_use]
    pub const fn new(api: &'a A, cache: &'a C, store: &'a ReactiveCartStore) -> Self {
        Self { api, cache, store }
    }

    fn commit(&self, lines: Vec<CartLine>) {
        self.cache.set(keys::CART_LINES, &lines);
        self.store.replace(lines);
    }

    /// Load the cart into the reactive store.
    ///
    /// Authenticated: the server cart overwrites both local copies. A fetch
    /// failure is logged and local state stays as it was. Unauthenticated:
    /// the durable cache is authoritative and loads as-is.
    pub async fn load(&self, session: Option<&Session>) {
        match session {
            Some(session) => match self.api.fetch_cart(session).await {
                Ok(lines) => self.commit(lines),
                Err(e) => tracing::warn!(error = %e, "cart fetch failed, keeping local state"),
            },
            None => {
                let lines: Vec<CartLine> = self.cache.get(keys::CART_LINES).unwrap_or_default();
                self.store.replace(lines);
            }
        }
    }

    /// Replay the stashed pending action through the authenticated add
    /// path, then install the merged server cart.
    ///
    /// The stash is taken before the network call, so the replay happens at
    /// most once per login even if the add fails; a failure is logged only.
    pub async fn after_login(&self, session: &Session) {
        let Some(action) = PendingActionStash::new(self.cache).take() else {
            return;
        };

        match self
            .api
            .add_item(session, action.product_id, action.qty)
            .await
        {
            Ok(lines) => self.commit(lines),
            Err(e) => {
                tracing::warn!(product_id = %action.product_id, error = %e, "stashed add failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::mutator::{CartMutator, Outcome};
    use crate::testutil::{FakeCartApi, action, action_for, session};
    use tiffinbox_core::PendingCartAction;

    #[tokio::test]
    async fn test_authenticated_load_overwrites_local_state() {
        let api = FakeCartApi::new();
        let cache = MemoryCache::new();
        let store = ReactiveCartStore::new();
        let engine = ReconciliationEngine::new(&api, &cache, &store);
        let s = session();

        // Local-only edit that the server never saw.
        store.add_line(action(9).into_line());
        api.seed(vec![action(2).into_line()]);

        engine.load(Some(&s)).await;

        let lines = store.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().qty, 2);
        let cached: Vec<tiffinbox_core::CartLine> = cache.get(keys::CART_LINES).unwrap();
        assert_eq!(cached.first().unwrap().qty, 2);
    }

    #[tokio::test]
    async fn test_guest_load_uses_durable_cache() {
        let api = FakeCartApi::new();
        let cache = MemoryCache::new();
        let store = ReactiveCartStore::new();
        let engine = ReconciliationEngine::new(&api, &cache, &store);

        cache.set(keys::CART_LINES, &vec![action(4).into_line()]);
        engine.load(None).await;

        assert_eq!(store.lines().first().unwrap().qty, 4);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_guest_load_with_empty_cache_is_empty_cart() {
        let api = FakeCartApi::new();
        let cache = MemoryCache::new();
        let store = ReactiveCartStore::new();
        let engine = ReconciliationEngine::new(&api, &cache, &store);

        engine.load(None).await;
        assert!(store.lines().is_empty());
    }

    #[tokio::test]
    async fn test_failed_authenticated_load_keeps_local_state() {
        let api = FakeCartApi::new();
        let cache = MemoryCache::new();
        let store = ReactiveCartStore::new();
        let engine = ReconciliationEngine::new(&api, &cache, &store);
        let s = session();

        store.add_line(action(3).into_line());
        api.fail_with_status(500);
        engine.load(Some(&s)).await;

        assert_eq!(store.lines().first().unwrap().qty, 3);
    }

    #[tokio::test]
    async fn test_three_guest_adds_then_login_applies_one_stashed_add() {
        let api = FakeCartApi::new();
        let cache = MemoryCache::new();
        let store = ReactiveCartStore::new();
        let mutator = CartMutator::new(&api, &cache, &store);
        let engine = ReconciliationEngine::new(&api, &cache, &store);
        let product_id = tiffinbox_core::ProductId::generate();

        // Pre-existing server cart for this customer.
        api.seed(vec![action_for(product_id, 2).into_line()]);

        for _ in 0..3 {
            let outcome = mutator.add(None, action_for(product_id, 1)).await;
            assert_eq!(outcome, Outcome::RedirectToLogin);
        }
        assert_eq!(api.call_count(), 0);

        let s = session();
        engine.after_login(&s).await;

        // Exactly one add of qty 1, merged onto the server's existing 2.
        let lines = store.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().qty, 3);

        // The stash is gone; a second drain does nothing.
        engine.after_login(&s).await;
        assert_eq!(store.lines().first().unwrap().qty, 3);
    }

    #[tokio::test]
    async fn test_after_login_without_stash_is_noop() {
        let api = FakeCartApi::new();
        let cache = MemoryCache::new();
        let store = ReactiveCartStore::new();
        let engine = ReconciliationEngine::new(&api, &cache, &store);

        engine.after_login(&session()).await;
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_stash_apply_still_consumes_the_stash() {
        let api = FakeCartApi::new();
        let cache = MemoryCache::new();
        let store = ReactiveCartStore::new();
        let engine = ReconciliationEngine::new(&api, &cache, &store);

        let stashed: PendingCartAction = action(1);
        crate::stash::PendingActionStash::new(&cache).save(&stashed);
        api.fail_with_status(500);

        engine.after_login(&session()).await;
        assert!(store.lines().is_empty());

        // The slot was drained even though the apply failed.
        assert!(crate::stash::PendingActionStash::new(&cache).take().is_none());
    }
}
