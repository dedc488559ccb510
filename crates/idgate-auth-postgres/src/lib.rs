//! PostgreSQL storage backend for idgate-auth
//!
//! Persists authorization codes in the `authorization_codes` table, with a
//! unique index on `code` and an index on `expire_at` for reaping.
//!
//! # Example
//!
//! ```ignore
//! use idgate_auth_postgres::PostgresAuthStorage;
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/idgate").await?;
//! storage.ensure_schema().await?;
//!
//! let codes: Arc<dyn AuthorizationCodeStorage> = Arc::new(storage.authorization_code_storage());
//! ```

pub mod authorization_code;
pub mod storage_adapters;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use authorization_code::AuthorizationCodeStorage;
pub use storage_adapters::ArcAuthorizationCodeStorage;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during auth storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Row already exists (conflict).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The row to write breaks an invariant the table relies on.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` if this is an `InvalidInput` error.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` if this is a client error (4xx equivalent).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::InvalidInput(_))
    }

    /// Returns `true` if this is a server error (5xx equivalent).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for authorization data.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new().connect(database_url).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the authorization code table and its indexes if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    pub async fn ensure_schema(&self) -> StorageResult<()> {
        self.authorization_codes().ensure_schema().await
    }

    /// Get authorization code storage operations.
    #[must_use]
    pub fn authorization_codes(&self) -> AuthorizationCodeStorage<'_> {
        AuthorizationCodeStorage::new(&self.pool)
    }

    /// Get an Arc-owning adapter implementing the idgate-auth storage trait.
    #[must_use]
    pub fn authorization_code_storage(&self) -> ArcAuthorizationCodeStorage {
        ArcAuthorizationCodeStorage::new(Arc::clone(&self.pool))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_conflict() {
        let err = StorageError::conflict("Authorization code already exists");
        assert!(err.is_conflict());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_storage_error_invalid_input() {
        let err = StorageError::invalid_input("expire_at must be after created_at");
        assert!(err.is_invalid_input());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(
            err.to_string(),
            "Invalid input: expire_at must be after created_at"
        );
    }

    #[test]
    fn test_storage_error_database() {
        let err = StorageError::from(sqlx_core::Error::PoolTimedOut);
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }
}
