//! Per-client signing certificate resolution.

use std::sync::Arc;

use crate::certificate::{CertificateManager, CertificateProvider};
use crate::types::Client;

/// Resolves the signing certificate provider for a client.
///
/// A client without a certificate reference, or whose reference no longer
/// resolves, is served by the manager's default provider. Resolution never
/// fails.
#[derive(Clone)]
pub struct CertificateRegistry {
    manager: Arc<dyn CertificateManager>,
}

impl CertificateRegistry {
    /// Creates a registry backed by `manager`.
    #[must_use]
    pub fn new(manager: Arc<dyn CertificateManager>) -> Self {
        Self { manager }
    }

    /// Resolves the provider that signs tokens for `client`.
    pub async fn resolve(&self, client: &Client) -> Arc<CertificateProvider> {
        let Some(certificate_id) = client.certificate.as_deref() else {
            return self.manager.default_certificate_provider();
        };

        match self.manager.get(certificate_id).await {
            Some(provider) => provider,
            None => {
                tracing::debug!(
                    client_id = %client.id,
                    certificate = %certificate_id,
                    "Client certificate not found, using default certificate"
                );
                self.manager.default_certificate_provider()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::InMemoryCertificateManager;
    use crate::token::SigningKeyPair;

    fn registry() -> CertificateRegistry {
        let manager = InMemoryCertificateManager::new(CertificateProvider::new(
            "default",
            SigningKeyPair::generate_ec().unwrap(),
        ));
        manager.register(CertificateProvider::new(
            "client-certificate",
            SigningKeyPair::generate_ec().unwrap(),
        ));
        CertificateRegistry::new(Arc::new(manager))
    }

    #[tokio::test]
    async fn test_resolve_client_certificate() {
        let client = Client::new("client-id").with_certificate("client-certificate");
        let provider = registry().resolve(&client).await;
        assert_eq!(provider.id(), "client-certificate");
    }

    #[tokio::test]
    async fn test_resolve_without_reference_uses_default() {
        let provider = registry().resolve(&Client::new("client-id")).await;
        assert_eq!(provider.id(), "default");
    }

    #[tokio::test]
    async fn test_resolve_unknown_reference_uses_default() {
        let client = Client::new("client-id").with_certificate("certificate-client");
        let provider = registry().resolve(&client).await;
        assert_eq!(provider.id(), "default");
    }
}
