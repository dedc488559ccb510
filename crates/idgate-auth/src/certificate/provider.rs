//! Certificate provider: a signing key addressed by certificate identifier.

use crate::token::{Jwk, SigningAlgorithm, SigningKeyPair};

/// A signing certificate that ID tokens can be signed with.
///
/// Clients reference providers by `id`; the key's own `kid` is what ends
/// up in the JWT header.
#[derive(Debug)]
pub struct CertificateProvider {
    id: String,
    key: SigningKeyPair,
}

impl CertificateProvider {
    /// Creates a provider for the given certificate identifier.
    #[must_use]
    pub fn new(id: impl Into<String>, key: SigningKeyPair) -> Self {
        Self { id: id.into(), key }
    }

    /// Certificate identifier, as referenced from client configuration.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The signing key pair.
    #[must_use]
    pub fn key(&self) -> &SigningKeyPair {
        &self.key
    }

    /// Signing algorithm of the underlying key.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.key.algorithm
    }

    /// Public key for publication in a JWKS document.
    #[must_use]
    pub fn jwk(&self) -> Jwk {
        self.key.to_jwk()
    }
}
