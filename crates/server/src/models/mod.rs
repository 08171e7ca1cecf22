//! Domain types for the storefront API.
//!
//! Row types map 1:1 to database tables; the `Public*` views are what leaves
//! the server (no password hashes, no refresh tokens).

pub mod customer;
pub mod owner;
pub mod principal;
pub mod product;

pub use customer::{Customer, PublicCustomer};
pub use owner::{Owner, PublicOwner};
pub use principal::Principal;
pub use product::Product;
