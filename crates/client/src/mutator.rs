//! Optimistic and pessimistic mutators.
//!
//! Two disciplines, chosen per operation by how bad a wrong intermediate
//! state would be:
//!
//! - Cart changes are pessimistic-then-apply: the server mutation goes out
//!   first and local state only moves on success. A cart that briefly shows
//!   an item the server rejected would be worse than a short wait.
//! - Like toggles are optimistic-with-rollback: flip locally, fire the
//!   mutation, reconcile to the server's answer or restore the snapshot.
//!
//! Neither path surfaces errors to the caller beyond the [`Outcome`]; a
//! failed cart add is logged and dropped, a failed like is rolled back.

use tiffinbox_core::{PendingCartAction, ProductId, VideoId};

use crate::api::{CartApi, LikeApi, LikeState};
use crate::cache::{DurableCache, keys};
use crate::session::Session;
use crate::stash::PendingActionStash;
use crate::store::{ReactiveCartStore, ReactiveLikeStore};

/// What the caller should do after a mutation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing further; local state already reflects whatever happened.
    Done,
    /// The operation needs a credential; send the user to login.
    RedirectToLogin,
}

/// Pessimistic cart mutator.
pub struct CartMutator<'a, A, C> {
    api: &'a A,
    cache: &'a C,
    store: &'a ReactiveCartStore,
}

impl<'a, A: CartApi, C: DurableCache> CartMutator<'a, A, C> {
    /// Wire a mutator over the shared store, cache, and transport.
    #[must_use]
    pub const fn new(api: &'a A, cache: &'a C, store: &'a ReactiveCartStore) -> Self {
        Self { api, cache, store }
    }

    /// Install the server's cart as local truth, store and cache in the
    /// same step.
    fn commit(&self, lines: Vec<tiffinbox_core::CartLine>) {
        self.cache.set(keys::CART_LINES, &lines);
        self.store.replace(lines);
    }

    /// Add to the cart.
    ///
    /// Without a session the action is stashed for replay after login and
    /// nothing else moves - not the store, not the server. With a session
    /// the server goes first; local state follows only its success.
    pub async fn add(&self, session: Option<&Session>, action: PendingCartAction) -> Outcome {
        let Some(session) = session else {
            PendingActionStash::new(self.cache).save(&action);
            return Outcome::RedirectToLogin;
        };

        match self
            .api
            .add_item(session, action.product_id, action.qty)
            .await
        {
            Ok(lines) => self.commit(lines),
            Err(e) => {
                tracing::warn!(product_id = %action.product_id, error = %e, "cart add failed");
            }
        }
        Outcome::Done
    }

    /// Remove a line from the cart.
    pub async fn remove(&self, session: Option<&Session>, product_id: ProductId) -> Outcome {
        let Some(session) = session else {
            return Outcome::RedirectToLogin;
        };

        match self.api.remove_item(session, product_id).await {
            Ok(lines) => self.commit(lines),
            Err(e) => {
                tracing::warn!(product_id = %product_id, error = %e, "cart remove failed");
            }
        }
        Outcome::Done
    }

    /// Bump a line's quantity by one. Same discipline as [`Self::add`]: the
    /// server goes first and local state follows only its success.
    pub async fn increment_qty(&self, session: Option<&Session>, product_id: ProductId) -> Outcome {
        self.change_qty(session, product_id, 1).await
    }

    /// Lower a line's quantity by one; no-op at quantity 1 (removal is
    /// explicit, never a side effect of decrementing).
    pub async fn decrement_qty(&self, session: Option<&Session>, product_id: ProductId) -> Outcome {
        if self
            .store
            .lines()
            .iter()
            .any(|l| l.product_id == product_id && l.qty <= 1)
        {
            return Outcome::Done;
        }
        self.change_qty(session, product_id, -1).await
    }

    async fn change_qty(
        &self,
        session: Option<&Session>,
        product_id: ProductId,
        delta: i32,
    ) -> Outcome {
        let Some(session) = session else {
            return Outcome::RedirectToLogin;
        };

        match self.api.change_qty(session, product_id, delta).await {
            Ok(lines) => self.commit(lines),
            Err(e) => {
                tracing::warn!(product_id = %product_id, error = %e, "cart quantity change failed");
            }
        }
        Outcome::Done
    }
}

/// Optimistic like mutator.
pub struct LikeMutator<'a, A> {
    api: &'a A,
    store: &'a ReactiveLikeStore,
}

impl<'a, A: LikeApi> LikeMutator<'a, A> {
    /// Wire a mutator over the shared like store and transport.
    #[must_use]
    pub const fn new(api: &'a A, store: &'a ReactiveLikeStore) -> Self {
        Self { api, store }
    }

    /// Toggle a like.
    ///
    /// Flips the local state immediately, then reconciles to the server's
    /// authoritative answer. On failure the snapshot is restored exactly;
    /// an auth failure additionally sends the user to login.
    pub async fn toggle(&self, session: Option<&Session>, video_id: VideoId) -> Outcome {
        let Some(session) = session else {
            return Outcome::RedirectToLogin;
        };

        let snapshot = self.store.get(video_id).unwrap_or(LikeState {
            likes_count: 0,
            is_liked: false,
        });
        let optimistic = if snapshot.is_liked {
            LikeState {
                likes_count: snapshot.likes_count - 1,
                is_liked: false,
            }
        } else {
            LikeState {
                likes_count: snapshot.likes_count + 1,
                is_liked: true,
            }
        };
        self.store.set(video_id, optimistic);

        match self.api.toggle_like(session, video_id).await {
            Ok(state) => {
                self.store.set(video_id, state);
                Outcome::Done
            }
            Err(e) => {
                self.store.set(video_id, snapshot);
                if e.is_auth_failure() {
                    Outcome::RedirectToLogin
                } else {
                    tracing::warn!(video_id = %video_id, error = %e, "like toggle failed");
                    Outcome::Done
                }
            }
        }
    }
}
