//! Signing boundary for ID tokens.
//!
//! The issuance service never touches key material directly. It hands the
//! resolved claim set and certificate provider to a [`TokenSigner`], which
//! returns the compact serialized token.

pub mod jwt;

use async_trait::async_trait;

use crate::certificate::CertificateProvider;
use crate::oidc::IdTokenClaims;

pub use jwt::{Jwk, JwtError, JwtSigner, SigningAlgorithm, SigningKeyPair};

/// Encodes a claim set into a signed compact token.
///
/// Implementations fail only on cryptographic or provider errors. Retries,
/// if any, belong to the implementation.
#[async_trait]
pub trait TokenSigner: Send + Sync {
    /// Signs `claims` with the key held by `provider`.
    ///
    /// # Errors
    ///
    /// Returns a `JwtError` if the provider's key cannot sign the claims.
    async fn encode(
        &self,
        claims: &IdTokenClaims,
        provider: &CertificateProvider,
    ) -> Result<String, JwtError>;
}
