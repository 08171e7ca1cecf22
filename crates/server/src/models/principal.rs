//! Resolved principals.

use uuid::Uuid;

use tiffinbox_core::PrincipalKind;

use super::customer::Customer;
use super::owner::Owner;

/// An authenticated identity of known kind.
///
/// Produced exactly once per request by the principal resolver and passed
/// explicitly to whatever consumes it. The bearer token itself carries no
/// kind discriminator; the tag here records which namespace the subject id
/// resolved in.
#[derive(Debug, Clone)]
pub enum Principal {
    Customer(Customer),
    Owner(Owner),
}

impl Principal {
    /// The subject id, regardless of kind.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Customer(c) => c.id.as_uuid(),
            Self::Owner(o) => o.id.as_uuid(),
        }
    }

    /// Which namespace this principal resolved in.
    #[must_use]
    pub const fn kind(&self) -> PrincipalKind {
        match self {
            Self::Customer(_) => PrincipalKind::Customer,
            Self::Owner(_) => PrincipalKind::Owner,
        }
    }
}
