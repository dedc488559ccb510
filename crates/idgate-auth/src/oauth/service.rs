//! Authorization code lifecycle: issue at the authorize step, redeem at the
//! token step.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::AuthResult;
use crate::config::AuthorizationCodeConfig;
use crate::error::AuthError;
use crate::oauth::code::AuthorizationCode;
use crate::storage::{self, AuthorizationCodeStorage};
use crate::types::{AuthorizationRequest, User};

/// Request parameter carrying the client's redirect URI.
pub const REDIRECT_URI_PARAMETER: &str = "redirect_uri";

/// Issues and redeems authorization codes.
#[derive(Clone)]
pub struct AuthorizationCodeService {
    storage: Arc<dyn AuthorizationCodeStorage>,
    config: AuthorizationCodeConfig,
}

impl AuthorizationCodeService {
    #[must_use]
    pub fn new(storage: Arc<dyn AuthorizationCodeStorage>, config: AuthorizationCodeConfig) -> Self {
        Self { storage, config }
    }

    /// Starts the background task that purges expired codes every
    /// `reaper_interval`.
    ///
    /// The task stops once the service and every other holder of the storage
    /// are dropped.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        storage::spawn_reaper(&self.storage, self.config.reaper_interval)
    }

    /// Issues a code for `request`, bound to the client and end user.
    ///
    /// A code value that collides with a live one is regenerated, up to
    /// `max_create_attempts` times in total.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateKey` if every attempt collided,
    /// `AuthError::Configuration` if the configured lifetime cannot be added
    /// to the current time, or the storage error that stopped the attempt.
    pub async fn create(
        &self,
        request: &AuthorizationRequest,
        user: Option<&User>,
    ) -> AuthResult<AuthorizationCode> {
        let attempts = self.config.max_create_attempts.max(1);
        let subject = user
            .map(|u| u.id.clone())
            .or_else(|| request.subject.clone());

        for attempt in 1..=attempts {
            let mut code = AuthorizationCode::new(request.client_id.clone(), self.config.lifetime)?
                .with_scopes(request.scopes.iter().cloned());
            code.subject = subject.clone();
            code.redirect_uri = request
                .parameter(REDIRECT_URI_PARAMETER)
                .map(str::to_string);

            match self.storage.create(code).await {
                Ok(stored) => {
                    tracing::debug!(
                        client_id = %request.client_id,
                        attempt = attempt,
                        "Issued authorization code"
                    );
                    return Ok(stored);
                }
                Err(AuthError::DuplicateKey) => {
                    tracing::warn!(
                        client_id = %request.client_id,
                        attempt = attempt,
                        "Authorization code collision, regenerating"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AuthError::DuplicateKey)
    }

    /// Redeems `code` for `client_id`.
    ///
    /// The code is consumed atomically; it cannot be redeemed again, even if
    /// it turns out to belong to another client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidGrant` if the code is unknown, expired,
    /// already redeemed, or was issued to another client.
    pub async fn remove(&self, code: &str, client_id: &str) -> AuthResult<AuthorizationCode> {
        let Some(authorization_code) = self.storage.consume(code).await? else {
            tracing::debug!(client_id = %client_id, "Authorization code not found or expired");
            return Err(AuthError::invalid_grant(
                "Authorization code is invalid or has expired",
            ));
        };

        if authorization_code.client_id != client_id {
            tracing::warn!(
                client_id = %client_id,
                issued_to = %authorization_code.client_id,
                "Authorization code redeemed by another client"
            );
            return Err(AuthError::invalid_grant(
                "Authorization code was not issued to this client",
            ));
        }

        Ok(authorization_code)
    }
}
