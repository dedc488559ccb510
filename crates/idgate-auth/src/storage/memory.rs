//! In-memory authorization code storage.
//!
//! Entries live in a [`DashMap`] keyed by code value, with a second map from
//! id to code value so ids stay unique. `consume` needs no extra lock:
//! `remove_if` checks expiry and removes under the same shard lock.
//!
//! Lock order is ids before codes. No code path holds a `codes` guard while
//! touching `ids`.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::AuthorizationCode;
use crate::storage::AuthorizationCodeStorage;

/// Authorization code storage backed by a concurrent map.
///
/// Expired entries stay in the map until [`cleanup_expired`] runs, but are
/// invisible to every read. Their ids stay taken until then. Pair with
/// [`spawn_reaper`](crate::storage::spawn_reaper) to bound memory.
///
/// [`cleanup_expired`]: AuthorizationCodeStorage::cleanup_expired
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationCodeStorage {
    codes: DashMap<String, AuthorizationCode>,
    ids: DashMap<String, String>,
}

impl InMemoryAuthorizationCodeStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including expired ones not yet reaped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns `true` if the entry stored under `code` carries `id`.
    fn holds(&self, code: &str, id: &str) -> bool {
        self.codes
            .get(code)
            .is_some_and(|entry| entry.id.as_deref() == Some(id))
    }

    fn release_id(&self, id: Option<&str>, code: &str) {
        if let Some(id) = id {
            self.ids.remove_if(id, |_, held| held == code);
        }
    }
}

#[async_trait]
impl AuthorizationCodeStorage for InMemoryAuthorizationCodeStorage {
    async fn create(&self, mut code: AuthorizationCode) -> AuthResult<AuthorizationCode> {
        if !code.has_valid_lifetime() {
            return Err(AuthError::invalid_request(
                "Authorization code must expire after it is created",
            ));
        }
        let id = code
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        let now = OffsetDateTime::now_utc();

        // Same code value under the same id falls through to the code map,
        // which decides between replacing an expired entry and DuplicateKey.
        let reserved = match self.ids.entry(id.clone()) {
            Entry::Occupied(entry) if *entry.get() == code.code => false,
            Entry::Occupied(entry) if self.holds(entry.get(), &id) => {
                return Err(AuthError::DuplicateKey);
            }
            Entry::Occupied(mut entry) => {
                entry.insert(code.code.clone());
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(code.code.clone());
                true
            }
        };

        let outcome = match self.codes.entry(code.code.clone()) {
            Entry::Occupied(mut entry) if entry.get().is_expired_at(now) => {
                Ok(Some(entry.insert(code.clone())))
            }
            Entry::Occupied(_) => Err(AuthError::DuplicateKey),
            Entry::Vacant(entry) => {
                entry.insert(code.clone());
                Ok(None)
            }
        };

        match outcome {
            Ok(Some(replaced)) if replaced.id.as_deref() != Some(id.as_str()) => {
                self.release_id(replaced.id.as_deref(), &replaced.code);
            }
            Ok(_) => {}
            Err(e) => {
                if reserved {
                    self.ids.remove_if(&id, |_, held| *held == code.code);
                }
                return Err(e);
            }
        }

        Ok(code)
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .codes
            .get(code)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value().clone()))
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let now = OffsetDateTime::now_utc();
        let consumed = self
            .codes
            .remove_if(code, |_, entry| !entry.is_expired_at(now))
            .map(|(_, entry)| entry);

        if let Some(entry) = &consumed {
            self.release_id(entry.id.as_deref(), &entry.code);
        }
        Ok(consumed)
    }

    async fn delete(&self, id: &str) -> AuthResult<Option<AuthorizationCode>> {
        let Some(code) = self.ids.get(id).map(|held| held.value().clone()) else {
            return Ok(None);
        };

        // The entry may have been consumed or replaced since the lookup.
        let deleted = self
            .codes
            .remove_if(&code, |_, entry| entry.id.as_deref() == Some(id))
            .map(|(_, entry)| entry);
        self.release_id(Some(id), &code);

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut removed = Vec::new();

        self.codes.retain(|_, entry| {
            if entry.is_expired_at(now) {
                removed.push((entry.id.clone(), entry.code.clone()));
                return false;
            }
            true
        });

        for (id, code) in &removed {
            self.release_id(id.as_deref(), code);
        }

        Ok(removed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn code(client_id: &str) -> AuthorizationCode {
        AuthorizationCode::new(client_id, Duration::from_secs(60))
            .unwrap()
            .with_subject("user-1")
            .with_scopes(["openid"])
    }

    fn expired(client_id: &str) -> AuthorizationCode {
        let mut code = code(client_id);
        code.created_at -= time::Duration::minutes(2);
        code.expire_at = code.created_at + time::Duration::minutes(1);
        code
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let storage = InMemoryAuthorizationCodeStorage::new();

        let input = code("client-id");

        let stored = storage.create(input.clone()).await.unwrap();

        assert!(stored.id.is_some());
        let found = storage.find_by_code(&stored.code).await.unwrap().unwrap();
        assert_eq!(found, stored);

        let mut without_id = found;
        without_id.id = None;
        assert_eq!(without_id, input);

        let consumed = storage.consume(&stored.code).await.unwrap();
        assert_eq!(consumed, Some(stored));
    }

    #[tokio::test]
    async fn test_create_keeps_given_id() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let mut code = code("client-id");
        code.id = Some("fixed-id".to_string());

        let stored = storage.create(code).await.unwrap();

        assert_eq!(stored.id.as_deref(), Some("fixed-id"));
    }

    #[tokio::test]
    async fn test_create_duplicate_id() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let mut first = code("client-a");
        first.id = Some("same-id".to_string());
        let mut second = code("client-b");
        second.id = Some("same-id".to_string());

        let first = storage.create(first).await.unwrap();
        let err = storage.create(second.clone()).await.unwrap_err();

        assert!(err.is_duplicate_key());
        assert_eq!(storage.len(), 1);
        assert!(storage.find_by_code(&second.code).await.unwrap().is_none());

        let deleted = storage.delete("same-id").await.unwrap();
        assert_eq!(deleted, Some(first));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_id_is_released_after_consume() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let mut first = code("client-a");
        first.id = Some("same-id".to_string());
        let first = storage.create(first).await.unwrap();
        storage.consume(&first.code).await.unwrap().unwrap();

        let mut second = code("client-b");
        second.id = Some("same-id".to_string());
        let second = storage.create(second).await.unwrap();

        let deleted = storage.delete("same-id").await.unwrap();
        assert_eq!(deleted, Some(second));
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_lifetime() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let mut code = code("client-id");
        code.expire_at = code.created_at;

        let err = storage.create(code).await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidRequest { .. }));
        assert!(err.is_client_error());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_live_code() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let first = storage.create(code("client-a")).await.unwrap();

        let mut duplicate = code("client-b");
        duplicate.code = first.code.clone();
        let err = storage.create(duplicate).await.unwrap_err();

        assert!(err.is_duplicate_key());
        let found = storage.find_by_code(&first.code).await.unwrap().unwrap();
        assert_eq!(found.client_id, "client-a");
    }

    #[tokio::test]
    async fn test_create_replaces_expired_code() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let stale = storage.create(expired("client-a")).await.unwrap();

        let mut fresh = code("client-b");
        fresh.code = stale.code.clone();
        storage.create(fresh).await.unwrap();

        let found = storage.find_by_code(&stale.code).await.unwrap().unwrap();
        assert_eq!(found.client_id, "client-b");
        assert_eq!(storage.len(), 1);

        // The replaced entry's id no longer resolves
        assert!(storage.delete(stale.id.as_deref().unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_once() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let stored = storage.create(code("client-id")).await.unwrap();

        let consumed = storage.consume(&stored.code).await.unwrap();
        assert_eq!(consumed, Some(stored.clone()));

        assert!(storage.consume(&stored.code).await.unwrap().is_none());
        assert!(storage.find_by_code(&stored.code).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_unknown_code() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        assert!(storage.consume("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_code_is_not_found() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let stored = storage.create(expired("client-id")).await.unwrap();

        assert!(storage.find_by_code(&stored.code).await.unwrap().is_none());
        assert!(storage.consume(&stored.code).await.unwrap().is_none());
        // Still physically present until reaped
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consume_single_winner() {
        let storage = Arc::new(InMemoryAuthorizationCodeStorage::new());
        let stored = storage.create(code("client-id")).await.unwrap();

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let code = stored.code.clone();
                tokio::spawn(async move { storage.consume(&code).await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap().is_some() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let stored = storage.create(code("client-id")).await.unwrap();
        let id = stored.id.clone().unwrap();

        let deleted = storage.delete(&id).await.unwrap();
        assert_eq!(deleted, Some(stored.clone()));

        assert!(storage.delete(&id).await.unwrap().is_none());
        assert!(storage.consume(&stored.code).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_expired_entry() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let stored = storage.create(expired("client-id")).await.unwrap();

        let deleted = storage.delete(stored.id.as_deref().unwrap()).await.unwrap();

        assert!(deleted.is_some());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let live = storage.create(code("client-id")).await.unwrap();
        storage.create(expired("client-id")).await.unwrap();
        storage.create(expired("client-id")).await.unwrap();

        assert_eq!(storage.cleanup_expired().await.unwrap(), 2);
        assert_eq!(storage.len(), 1);
        assert!(storage.find_by_code(&live.code).await.unwrap().is_some());
        assert_eq!(storage.cleanup_expired().await.unwrap(), 0);
    }
}
