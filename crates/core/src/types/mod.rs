//! Core types for Tiffinbox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod principal;

pub use cart::{CartLine, PendingCartAction};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use principal::PrincipalKind;
