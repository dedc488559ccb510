//! Authorization code storage trait.
//!
//! # Implementation Notes
//!
//! - Never log code values
//! - `consume` must be a single indivisible find-and-delete at the storage
//!   layer, never a lookup followed by a separate delete
//! - Expiry is enforced at read time: an expired entry behaves exactly like
//!   a missing one, whether or not it has been physically reaped yet

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::AuthorizationCode;

/// Storage for pending authorization codes.
///
/// # Implementations
///
/// - In-memory (`InMemoryAuthorizationCodeStorage`)
/// - PostgreSQL (in `idgate-auth-postgres` crate)
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Persists a code and returns the stored entry.
    ///
    /// An identifier is generated when `code.id` is `None`. A live entry
    /// with the same code value already present is rejected; an expired one
    /// is replaced. Ids are unique across every stored entry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRequest` if `expire_at` is not after
    /// `created_at`, `AuthError::DuplicateKey` if the code value is already
    /// live or the id is taken, or `AuthError::Storage` if the backend fails.
    async fn create(&self, code: AuthorizationCode) -> AuthResult<AuthorizationCode>;

    /// Finds a live code by value. Expired entries are reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Atomically finds and deletes a live code by value.
    ///
    /// Of any number of concurrent callers for the same code, at most one
    /// observes `Some`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    ///
    /// # Atomicity
    ///
    /// A SQL backend can express this as one statement:
    ///
    /// ```sql
    /// DELETE FROM authorization_codes
    /// WHERE code = $1 AND expire_at > NOW()
    /// RETURNING *
    /// ```
    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Atomically finds and deletes an entry by identifier, regardless of
    /// expiry. Used for early invalidation.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, id: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Physically removes expired entries and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
