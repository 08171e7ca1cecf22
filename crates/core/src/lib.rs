//! Tiffinbox Core - Shared types library.
//!
//! This crate provides common types used across all Tiffinbox components:
//! - `server` - Authoritative storefront API
//! - `client` - Client-side cart/session engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, principals, and cart wire types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
