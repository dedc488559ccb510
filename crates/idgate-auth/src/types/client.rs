//! OAuth client as seen by the issuance core.
//!
//! Registration, secrets and redirect URI policy live with the client
//! registry; only the fields that influence ID token signing are modeled.

use serde::{Deserialize, Serialize};

/// A registered OAuth client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier.
    pub id: String,

    /// Identifier of the signing certificate configured for this client.
    /// `None` means the default certificate is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

impl Client {
    /// Creates a client without a dedicated signing certificate.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            certificate: None,
        }
    }

    /// Sets the signing certificate reference.
    #[must_use]
    pub fn with_certificate(mut self, certificate: impl Into<String>) -> Self {
        self.certificate = Some(certificate.into());
        self
    }
}
