//! Background removal of expired authorization codes.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::storage::AuthorizationCodeStorage;

/// Spawns a task that calls `cleanup_expired` on `storage` every `interval`.
///
/// The task holds only a weak reference and exits once the storage is
/// dropped. Abort the returned handle to stop it earlier. Failures are
/// logged and retried on the next tick.
///
/// Must be called from within a tokio runtime.
pub fn spawn_reaper<S>(storage: &Arc<S>, interval: Duration) -> JoinHandle<()>
where
    S: AuthorizationCodeStorage + ?Sized + 'static,
{
    let storage: Weak<S> = Arc::downgrade(storage);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(storage) = storage.upgrade() else {
                tracing::debug!("Authorization code storage dropped, stopping reaper");
                break;
            };

            match storage.cleanup_expired().await {
                Ok(removed) if removed > 0 => {
                    tracing::debug!(removed = removed, "Removed expired authorization codes");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Authorization code cleanup failed");
                }
                _ => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::AuthorizationCode;
    use crate::storage::InMemoryAuthorizationCodeStorage;

    fn expired() -> AuthorizationCode {
        let mut code = AuthorizationCode::new("client-id", Duration::from_secs(60)).unwrap();
        code.created_at -= time::Duration::minutes(2);
        code.expire_at = code.created_at + time::Duration::minutes(1);
        code
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_codes() {
        let storage = Arc::new(InMemoryAuthorizationCodeStorage::new());
        storage.create(expired()).await.unwrap();
        let live = storage
            .create(AuthorizationCode::new("client-id", Duration::from_secs(60)).unwrap())
            .await
            .unwrap();

        let handle = spawn_reaper(&storage, Duration::from_millis(10));

        for _ in 0..100 {
            if storage.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(storage.len(), 1);
        assert!(storage.find_by_code(&live.code).await.unwrap().is_some());
        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_stops_when_storage_dropped() {
        let storage = Arc::new(InMemoryAuthorizationCodeStorage::new());
        let handle = spawn_reaper(&storage, Duration::from_millis(10));

        drop(storage);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("reaper should exit")
            .unwrap();
    }
}
