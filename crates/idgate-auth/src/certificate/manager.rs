//! Certificate manager contract and in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::AuthResult;
use crate::certificate::CertificateProvider;
use crate::config::SigningConfig;
use crate::error::AuthError;
use crate::token::{Jwk, SigningKeyPair};

/// Lookup of signing certificate providers.
///
/// A miss in [`get`](Self::get) is a normal outcome, not a failure; callers
/// fall back to [`default_certificate_provider`](Self::default_certificate_provider),
/// which always succeeds.
#[async_trait]
pub trait CertificateManager: Send + Sync {
    /// Finds the provider registered under `certificate_id`.
    async fn get(&self, certificate_id: &str) -> Option<Arc<CertificateProvider>>;

    /// Returns the process-wide default provider.
    fn default_certificate_provider(&self) -> Arc<CertificateProvider>;
}

/// Certificate manager holding providers in a concurrent map.
#[derive(Debug)]
pub struct InMemoryCertificateManager {
    providers: DashMap<String, Arc<CertificateProvider>>,
    default_provider: Arc<CertificateProvider>,
}

impl InMemoryCertificateManager {
    /// Creates a manager with the given default provider and no others.
    #[must_use]
    pub fn new(default_provider: CertificateProvider) -> Self {
        Self {
            providers: DashMap::new(),
            default_provider: Arc::new(default_provider),
        }
    }

    /// Creates a manager whose default provider uses a freshly generated key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the configured algorithm is not
    /// supported or key generation fails.
    pub fn from_config(config: &SigningConfig) -> AuthResult<Self> {
        let algorithm = config
            .signing_algorithm()
            .map_err(|e| AuthError::configuration(e.to_string()))?;
        let key = SigningKeyPair::generate(algorithm)
            .map_err(|e| AuthError::configuration(format!("Default signing key: {}", e)))?;

        tracing::info!(
            certificate = %config.default_certificate,
            algorithm = %algorithm,
            kid = %key.kid,
            "Generated default signing certificate"
        );

        Ok(Self::new(CertificateProvider::new(
            config.default_certificate.clone(),
            key,
        )))
    }

    /// Registers a provider, replacing any provider with the same identifier.
    ///
    /// Returns the replaced provider, if any.
    pub fn register(&self, provider: CertificateProvider) -> Option<Arc<CertificateProvider>> {
        let id = provider.id().to_string();
        tracing::debug!(certificate = %id, "Registering signing certificate");
        self.providers.insert(id, Arc::new(provider))
    }

    /// Removes a provider. Clients still referencing it fall back to the default.
    pub fn remove(&self, certificate_id: &str) -> Option<Arc<CertificateProvider>> {
        self.providers.remove(certificate_id).map(|(_, p)| p)
    }

    /// Public keys of the default provider and every registered provider.
    #[must_use]
    pub fn jwks(&self) -> Vec<Jwk> {
        std::iter::once(self.default_provider.jwk())
            .chain(self.providers.iter().map(|entry| entry.value().jwk()))
            .collect()
    }
}

#[async_trait]
impl CertificateManager for InMemoryCertificateManager {
    async fn get(&self, certificate_id: &str) -> Option<Arc<CertificateProvider>> {
        self.providers
            .get(certificate_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn default_certificate_provider(&self) -> Arc<CertificateProvider> {
        Arc::clone(&self.default_provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SigningAlgorithm;

    fn provider(id: &str) -> CertificateProvider {
        CertificateProvider::new(id, SigningKeyPair::generate_ec().unwrap())
    }

    #[tokio::test]
    async fn test_get_registered_provider() {
        let manager = InMemoryCertificateManager::new(provider("default"));
        manager.register(provider("client-cert"));

        let found = manager.get("client-cert").await.unwrap();
        assert_eq!(found.id(), "client-cert");
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let manager = InMemoryCertificateManager::new(provider("default"));
        assert!(manager.get("missing").await.is_none());
        assert_eq!(manager.default_certificate_provider().id(), "default");
    }

    #[tokio::test]
    async fn test_remove_provider() {
        let manager = InMemoryCertificateManager::new(provider("default"));
        manager.register(provider("client-cert"));

        assert!(manager.remove("client-cert").is_some());
        assert!(manager.get("client-cert").await.is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let manager = InMemoryCertificateManager::new(provider("default"));
        assert!(manager.register(provider("client-cert")).is_none());
        assert!(manager.register(provider("client-cert")).is_some());
        assert_eq!(manager.jwks().len(), 2);

        let found = tokio_test::block_on(manager.get("client-cert"));
        assert!(found.is_some());
    }

    #[test]
    fn test_from_config_generates_default() {
        let config = SigningConfig {
            algorithm: "ES384".to_string(),
            default_certificate: "platform".to_string(),
        };
        let manager = InMemoryCertificateManager::from_config(&config).unwrap();
        let default = manager.default_certificate_provider();
        assert_eq!(default.id(), "platform");
        assert_eq!(default.algorithm(), SigningAlgorithm::ES384);
    }

    #[test]
    fn test_from_config_rejects_unknown_algorithm() {
        let config = SigningConfig {
            algorithm: "none".to_string(),
            default_certificate: "platform".to_string(),
        };
        let err = InMemoryCertificateManager::from_config(&config).unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }
}
