//! Arc-owning adapter implementing the idgate-auth storage trait.
//!
//! The borrowing storage type in [`crate::authorization_code`] cannot be
//! held as `Arc<dyn AuthorizationCodeStorage>`; this wrapper owns the pool.

use std::sync::Arc;

use async_trait::async_trait;
use idgate_auth::oauth::AuthorizationCode;
use idgate_auth::storage::AuthorizationCodeStorage as AuthorizationCodeStorageTrait;
use idgate_auth::{AuthError, AuthResult};

use crate::authorization_code::AuthorizationCodeStorage;
use crate::{PgPool, StorageError};

fn to_auth_error(error: StorageError) -> AuthError {
    match error {
        StorageError::Conflict(_) => AuthError::DuplicateKey,
        StorageError::InvalidInput(message) => AuthError::invalid_request(message),
        other => AuthError::storage(other.to_string()),
    }
}

/// Arc-owning PostgreSQL authorization code storage adapter.
#[derive(Clone)]
pub struct ArcAuthorizationCodeStorage {
    pool: Arc<PgPool>,
}

impl ArcAuthorizationCodeStorage {
    /// Create a new Arc-owning authorization code storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationCodeStorageTrait for ArcAuthorizationCodeStorage {
    async fn create(&self, code: AuthorizationCode) -> AuthResult<AuthorizationCode> {
        let storage = AuthorizationCodeStorage::new(&self.pool);
        storage.create(&code).await.map_err(to_auth_error)
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let storage = AuthorizationCodeStorage::new(&self.pool);
        storage.find_by_code(code).await.map_err(to_auth_error)
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let storage = AuthorizationCodeStorage::new(&self.pool);
        storage.consume(code).await.map_err(to_auth_error)
    }

    async fn delete(&self, id: &str) -> AuthResult<Option<AuthorizationCode>> {
        let storage = AuthorizationCodeStorage::new(&self.pool);
        storage.delete(id).await.map_err(to_auth_error)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let storage = AuthorizationCodeStorage::new(&self.pool);
        let deleted = storage.delete_expired().await.map_err(to_auth_error)?;

        if deleted > 0 {
            tracing::info!(deleted = deleted, "Cleaned up expired authorization codes");
        }

        Ok(deleted)
    }
}
