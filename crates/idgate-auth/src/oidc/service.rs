//! ID token issuance.
//!
//! ```ignore
//! use idgate_auth::oidc::{ClaimsResolver, IdTokenService};
//!
//! let service = IdTokenService::new(registry, ClaimsResolver::new(issuer), Arc::new(JwtSigner::new()));
//! let id_token = service.issue(&request, &client, Some(&user)).await?;
//! ```

use std::sync::Arc;

use crate::AuthResult;
use crate::certificate::CertificateRegistry;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::oidc::resolver::ClaimsResolver;
use crate::token::TokenSigner;
use crate::types::{AuthorizationRequest, Client, User};

/// Produces one signed ID token per request.
///
/// Certificate resolution and claims resolution are independent and run
/// concurrently; the signer is invoked once both complete. No retries are
/// performed at this layer.
#[derive(Clone)]
pub struct IdTokenService {
    registry: CertificateRegistry,
    resolver: ClaimsResolver,
    signer: Arc<dyn TokenSigner>,
}

impl IdTokenService {
    /// Creates a new issuance service.
    #[must_use]
    pub fn new(
        registry: CertificateRegistry,
        resolver: ClaimsResolver,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self {
            registry,
            resolver,
            signer,
        }
    }

    /// Creates a service whose issuer comes from `config`.
    #[must_use]
    pub fn from_config(
        config: &AuthConfig,
        registry: CertificateRegistry,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self::new(registry, ClaimsResolver::new(config.issuer.clone()), signer)
    }

    /// Issues a signed ID token for `client`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the signer fails. The signer's output
    /// is returned unchanged on success.
    pub async fn issue(
        &self,
        request: &AuthorizationRequest,
        client: &Client,
        user: Option<&User>,
    ) -> AuthResult<String> {
        let (provider, claims) = tokio::join!(self.registry.resolve(client), async {
            self.resolver.resolve(request, user)
        });

        let token = self
            .signer
            .encode(&claims, &provider)
            .await
            .map_err(|e| {
                tracing::warn!(
                    client_id = %client.id,
                    certificate = %provider.id(),
                    error = %e,
                    "Failed to sign ID token"
                );
                AuthError::signing(format!("Failed to sign ID token: {}", e))
            })?;

        tracing::debug!(
            client_id = %client.id,
            certificate = %provider.id(),
            claims = claims.additional.len(),
            "Issued ID token"
        );

        Ok(token)
    }
}
