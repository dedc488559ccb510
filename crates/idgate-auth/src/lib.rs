//! # idgate-auth
//!
//! Token issuance core of the idgate OAuth 2.0 / OpenID Connect gateway.
//!
//! This crate provides:
//! - ID token claim resolution from granted scopes, the `claims` request
//!   parameter and the end-user profile
//! - Per-client signing certificate resolution with a default fallback
//! - ID token issuance over a pluggable signing boundary
//! - Authorization code storage with single-use consume and expiry
//!
//! ## Modules
//!
//! - [`config`] - Issuance and authorization code configuration
//! - [`oidc`] - Claims resolution and ID token issuance
//! - [`certificate`] - Signing certificate providers and per-client resolution
//! - [`token`] - Signing boundary and JWT key handling
//! - [`oauth`] - Authorization code model and lifecycle service
//! - [`storage`] - Authorization code storage trait and in-memory backend
//! - [`types`] - Client, user and request context

pub mod certificate;
pub mod config;
pub mod error;
pub mod oauth;
pub mod oidc;
pub mod storage;
pub mod token;
pub mod types;

pub use certificate::{
    CertificateManager, CertificateProvider, CertificateRegistry, InMemoryCertificateManager,
};
pub use config::{
    AuthConfig, AuthorizationCodeConfig, ConfigError, MAX_AUTHORIZATION_CODE_LIFETIME, SigningConfig,
};
pub use error::{AuthError, ErrorCategory};
pub use oauth::{AuthorizationCode, AuthorizationCodeService};
pub use oidc::{
    ClaimsRequest, ClaimsResolver, ID_TOKEN_LIFETIME_SECS, IdTokenClaims, IdTokenService, Scope,
    StandardClaims,
};
pub use storage::{AuthorizationCodeStorage, InMemoryAuthorizationCodeStorage, spawn_reaper};
pub use token::{JwtError, JwtSigner, SigningAlgorithm, SigningKeyPair, TokenSigner};
pub use types::{AuthorizationRequest, Client, User};

/// Type alias for issuance and authorization code results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use idgate_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::certificate::{
        CertificateManager, CertificateProvider, CertificateRegistry, InMemoryCertificateManager,
    };
    pub use crate::config::{AuthConfig, AuthorizationCodeConfig, ConfigError, SigningConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::oauth::{AuthorizationCode, AuthorizationCodeService};
    pub use crate::oidc::{ClaimsResolver, IdTokenClaims, IdTokenService};
    pub use crate::storage::{
        AuthorizationCodeStorage, InMemoryAuthorizationCodeStorage, spawn_reaper,
    };
    pub use crate::token::{JwtSigner, SigningKeyPair, TokenSigner};
    pub use crate::types::{AuthorizationRequest, Client, User};
}
