//! Shared in-memory fakes for exercising the mutators and the
//! reconciliation engine without a server.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use tiffinbox_core::{CartLine, PendingCartAction, Price, ProductId, VideoId};

use crate::api::{ApiError, CartApi, LikeApi, LikeState};
use crate::session::Session;

pub fn session() -> Session {
    Session::new("access-token".to_owned(), "refresh-token".to_owned())
}

pub fn action(qty: u32) -> PendingCartAction {
    action_for(ProductId::generate(), qty)
}

pub fn action_for(product_id: ProductId, qty: u32) -> PendingCartAction {
    PendingCartAction {
        product_id,
        name: "Paneer Tiffin".to_owned(),
        price: Price::from_rupees(120),
        image_url: "https://cdn.example/paneer.jpg".to_owned(),
        kind: "veg".to_owned(),
        qty,
    }
}

/// Server-cart fake with the real upsert semantics.
pub struct FakeCartApi {
    cart: Mutex<Vec<CartLine>>,
    fail_status: Mutex<Option<u16>>,
    calls: Mutex<u32>,
}

impl FakeCartApi {
    pub fn new() -> Self {
        Self {
            cart: Mutex::new(Vec::new()),
            fail_status: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    /// Make every subsequent call fail with this status.
    pub fn fail_with_status(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    /// Seed the server-side cart directly.
    pub fn seed(&self, lines: Vec<CartLine>) {
        *self.cart.lock().unwrap() = lines;
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }

    fn check(&self) -> Result<(), ApiError> {
        *self.calls.lock().unwrap() += 1;
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(ApiError::Status(status)),
            None => Ok(()),
        }
    }
}

impl CartApi for FakeCartApi {
    async fn add_item(
        &self,
        _session: &Session,
        product_id: ProductId,
        qty: u32,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.check()?;
        let mut cart = self.cart.lock().unwrap();
        if let Some(line) = cart.iter_mut().find(|l| l.product_id == product_id) {
            line.qty += qty;
        } else {
            cart.push(action_for(product_id, qty).into_line());
        }
        Ok(cart.clone())
    }

    async fn change_qty(
        &self,
        _session: &Session,
        product_id: ProductId,
        delta: i32,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.check()?;
        let mut cart = self.cart.lock().unwrap();
        if let Some(line) = cart.iter_mut().find(|l| l.product_id == product_id) {
            let next = i64::from(line.qty) + i64::from(delta);
            line.qty = u32::try_from(next.max(1)).unwrap();
        }
        Ok(cart.clone())
    }

    async fn fetch_cart(&self, _session: &Session) -> Result<Vec<CartLine>, ApiError> {
        self.check()?;
        Ok(self.cart.lock().unwrap().clone())
    }

    async fn remove_item(
        &self,
        _session: &Session,
        product_id: ProductId,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.check()?;
        let mut cart = self.cart.lock().unwrap();
        cart.retain(|l| l.product_id != product_id);
        Ok(cart.clone())
    }
}

/// Like fake that flips server-side state on every successful toggle.
pub struct FakeLikeApi {
    state: Mutex<LikeState>,
    fail_status: Mutex<Option<u16>>,
}

impl FakeLikeApi {
    pub fn new(likes_count: i64, is_liked: bool) -> Self {
        Self {
            state: Mutex::new(LikeState {
                likes_count,
                is_liked,
            }),
            fail_status: Mutex::new(None),
        }
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }
}

impl LikeApi for FakeLikeApi {
    async fn toggle_like(
        &self,
        _session: &Session,
        _video_id: VideoId,
    ) -> Result<LikeState, ApiError> {
        if let Some(status) = *self.fail_status.lock().unwrap() {
            return Err(ApiError::Status(status));
        }
        let mut state = self.state.lock().unwrap();
        *state = if state.is_liked {
            LikeState {
                likes_count: state.likes_count - 1,
                is_liked: false,
            }
        } else {
            LikeState {
                likes_count: state.likes_count + 1,
                is_liked: true,
            }
        };
        Ok(*state)
    }
}
