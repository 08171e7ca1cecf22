//! Principal kinds.
//!
//! A principal is an authenticated identity. The storefront has exactly two
//! disjoint kinds, and a bearer token carries no kind discriminator - the
//! kind is discovered by resolving the subject id against both namespaces.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The kind of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// A shopper with a cart.
    Customer,
    /// A store owner.
    Owner,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Owner => write!(f, "owner"),
        }
    }
}
