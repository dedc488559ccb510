//! Authorization request context carried into token issuance.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Request parameter holding a JSON-encoded claims request.
pub const CLAIMS_PARAMETER: &str = "claims";

/// Request parameter holding the OpenID Connect nonce.
pub const NONCE_PARAMETER: &str = "nonce";

/// Context of the authorization or token request being served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Requesting client identifier.
    pub client_id: String,

    /// Scopes granted to the client.
    pub scopes: HashSet<String>,

    /// Authenticated end user, absent for client-only issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Original request parameters; each name may carry several values.
    #[serde(default)]
    pub request_parameters: HashMap<String, Vec<String>>,
}

impl AuthorizationRequest {
    /// Creates a request context for `client_id` with the given scopes.
    #[must_use]
    pub fn new<I, S>(client_id: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
            subject: None,
            request_parameters: HashMap::new(),
        }
    }

    /// Sets the end-user subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Appends a value to a request parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// First value of the named request parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.request_parameters
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if `scope` was granted.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}
