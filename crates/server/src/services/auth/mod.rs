//! Authentication service.
//!
//! Registration, login, token issuance/rotation/redemption, and principal
//! resolution for both namespaces. The resolver is the only place that maps
//! a bare token subject to a principal kind.

mod error;
mod tokens;

pub use error::AuthError;
pub use tokens::{Claims, TokenKeys, TokenKind, TokenPair};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use tiffinbox_core::Email;

use crate::db::customers::CustomerRepository;
use crate::db::owners::OwnerRepository;
use crate::models::{Customer, Owner, Principal};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles both principal namespaces. Customers log in with email or phone
/// number; owners with email only, and owner registration is gated to a
/// single allow-listed address.
pub struct AuthService<'a> {
    customers: CustomerRepository<'a>,
    owners: OwnerRepository<'a>,
    keys: &'a TokenKeys,
    owner_allowlist_email: &'a Email,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        keys: &'a TokenKeys,
        owner_allowlist_email: &'a Email,
    ) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
            owners: OwnerRepository::new(pool),
            keys,
            owner_allowlist_email,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` / `AuthError::WeakPassword` on
    /// validation failure, `AuthError::AlreadyExists` on a duplicate email or
    /// phone number.
    pub async fn register_customer(
        &self,
        username: &str,
        email: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<Customer, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let customer = self
            .customers
            .create(username, &email, phone_number, &password_hash)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(customer)
    }

    /// Register a new owner. Only the allow-listed email may register.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAllowListed` for any other email,
    /// `AuthError::AlreadyExists` if the owner is already registered.
    pub async fn register_owner(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Owner, AuthError> {
        let email = Email::parse(email)?;
        if email != *self.owner_allowlist_email {
            return Err(AuthError::NotAllowListed);
        }
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let owner = self
            .owners
            .create(name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(owner)
    }

    // =========================================================================
    // Login / logout
    // =========================================================================

    /// Login a customer by email or phone number.
    ///
    /// On success a fresh token pair is issued; storing the refresh token
    /// rotates out whatever token was live before.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong identifier or
    /// password - the caller cannot tell which.
    pub async fn login_customer(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(Customer, TokenPair), AuthError> {
        let customer = self
            .customers
            .get_by_email_or_phone(identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &customer.password_hash)?;

        let pair = self.issue_pair_for_customer(&customer).await?;
        Ok((customer, pair))
    }

    /// Login an owner by email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password.
    pub async fn login_owner(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Owner, TokenPair), AuthError> {
        let email = Email::parse(email)?;
        let owner = self
            .owners
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &owner.password_hash)?;

        let pair = self.issue_pair_for_owner(&owner).await?;
        Ok((owner, pair))
    }

    /// Logout: clear the principal's live refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the update fails.
    pub async fn logout(&self, principal: &Principal) -> Result<(), AuthError> {
        match principal {
            Principal::Customer(c) => self.customers.clear_refresh_token(c.id).await?,
            Principal::Owner(o) => self.owners.clear_refresh_token(o.id).await?,
        }
        Ok(())
    }

    // =========================================================================
    // Token issuance & redemption
    // =========================================================================

    async fn issue_pair_for_customer(&self, customer: &Customer) -> Result<TokenPair, AuthError> {
        let access_token = self.keys.sign_access(customer.id.as_uuid())?;
        let refresh_token = self.keys.sign_refresh(customer.id.as_uuid())?;
        self.customers
            .store_refresh_token(customer.id, &refresh_token)
            .await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn issue_pair_for_owner(&self, owner: &Owner) -> Result<TokenPair, AuthError> {
        let access_token = self.keys.sign_access(owner.id.as_uuid())?;
        let refresh_token = self.keys.sign_refresh(owner.id.as_uuid())?;
        self.owners
            .store_refresh_token(owner.id, &refresh_token)
            .await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Redeem a refresh token for a fresh pair, rotating atomically.
    ///
    /// Verification, the staleness check, and issuance of the replacement are
    /// one logical transition: the staleness check and the overwrite are a
    /// single compare-and-swap UPDATE, so a token redeems at most once - the
    /// old token never validates again, including against itself.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a malformed/expired token,
    /// `AuthError::UnknownPrincipal` if the subject exists in neither
    /// namespace, and `AuthError::TokenReuse` when the presented token is not
    /// the stored one (replay of a rotated-out token).
    pub async fn redeem_refresh(&self, token: &str) -> Result<(Principal, TokenPair), AuthError> {
        let claims = self
            .keys
            .verify_refresh(token)
            .map_err(|_| AuthError::InvalidToken)?;

        // Probe the customer namespace first; a miss there is expected.
        if let Some(customer) = self.customers.get_by_id(claims.sub.into()).await? {
            let access_token = self.keys.sign_access(claims.sub)?;
            let refresh_token = self.keys.sign_refresh(claims.sub)?;
            let rotated = self
                .customers
                .rotate_refresh_token(customer.id, token, &refresh_token)
                .await?;
            if !rotated {
                tracing::warn!(subject = %claims.sub, "stale refresh token presented");
                return Err(AuthError::TokenReuse);
            }
            return Ok((
                Principal::Customer(customer),
                TokenPair {
                    access_token,
                    refresh_token,
                },
            ));
        }

        if let Some(owner) = self.owners.get_by_id(claims.sub.into()).await? {
            let access_token = self.keys.sign_access(claims.sub)?;
            let refresh_token = self.keys.sign_refresh(claims.sub)?;
            let rotated = self
                .owners
                .rotate_refresh_token(owner.id, token, &refresh_token)
                .await?;
            if !rotated {
                tracing::warn!(subject = %claims.sub, "stale refresh token presented");
                return Err(AuthError::TokenReuse);
            }
            return Ok((
                Principal::Owner(owner),
                TokenPair {
                    access_token,
                    refresh_token,
                },
            ));
        }

        Err(AuthError::UnknownPrincipal)
    }

    // =========================================================================
    // Principal resolution
    // =========================================================================

    /// Resolve a bearer access token to a principal of unknown kind.
    ///
    /// Probes the customer namespace, then the owner namespace. Absence in
    /// the first is expected control flow; only absence in both is an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad token and
    /// `AuthError::UnknownPrincipal` if the subject resolves nowhere.
    pub async fn resolve(&self, bearer_token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .keys
            .verify_access(bearer_token)
            .map_err(|_| AuthError::InvalidToken)?;

        if let Some(customer) = self.customers.get_by_id(claims.sub.into()).await? {
            return Ok(Principal::Customer(customer));
        }

        if let Some(owner) = self.owners.get_by_id(claims.sub.into()).await? {
            return Ok(Principal::Owner(owner));
        }

        Err(AuthError::UnknownPrincipal)
    }
}

// =============================================================================
// Password helpers
// =============================================================================

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
