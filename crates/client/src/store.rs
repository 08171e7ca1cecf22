//! In-memory reactive stores.
//!
//! State the UI renders, behind `tokio::sync::watch`: every mutation
//! publishes a fresh snapshot, observers hold a receiver and re-render on
//! change. Reads are cheap clones of the current snapshot.

use std::collections::HashMap;

use tokio::sync::watch;

use tiffinbox_core::{CartLine, ProductId, VideoId};

use crate::api::LikeState;

/// Observable cart state.
pub struct ReactiveCartStore {
    tx: watch::Sender<Vec<CartLine>>,
}

impl Default for ReactiveCartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveCartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Subscribe to cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.tx.subscribe()
    }

    /// Snapshot of the current lines.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.tx.borrow().clone()
    }

    /// Merge a line in: same product id bumps the quantity, a new product
    /// pushes a line with the payload's quantity.
    pub fn add_line(&self, line: CartLine) {
        self.tx.send_modify(|lines| {
            if let Some(existing) = lines.iter_mut().find(|l| l.product_id == line.product_id) {
                existing.qty += line.qty;
            } else {
                lines.push(line);
            }
        });
    }

    /// Drop the line for a product. Absent product is a no-op.
    pub fn remove_line(&self, product_id: ProductId) {
        self.tx
            .send_modify(|lines| lines.retain(|l| l.product_id != product_id));
    }

    /// Replace the whole cart (reconciliation path).
    pub fn replace(&self, lines: Vec<CartLine>) {
        self.tx.send_replace(lines);
    }
}

/// Observable per-video like state.
pub struct ReactiveLikeStore {
    tx: watch::Sender<HashMap<VideoId, LikeState>>,
}

impl Default for ReactiveLikeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveLikeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(HashMap::new());
        Self { tx }
    }

    /// Subscribe to like-state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HashMap<VideoId, LikeState>> {
        self.tx.subscribe()
    }

    /// Current state for a video, if any toggle has touched it.
    #[must_use]
    pub fn get(&self, video_id: VideoId) -> Option<LikeState> {
        self.tx.borrow().get(&video_id).copied()
    }

    /// Seed the state for a video (e.g. from an initial page payload).
    pub fn set(&self, video_id: VideoId, state: LikeState) {
        self.tx.send_modify(|map| {
            map.insert(video_id, state);
        });
    }
}
