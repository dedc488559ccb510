//! The `claims` request parameter (OIDC Core §5.5).
//!
//! ```json
//! {"id_token": {"name": {"essential": true}, "email": null}}
//! ```
//!
//! Essential markers are parsed and exposed but do not gate issuance: a
//! requested claim missing from the profile is simply omitted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::AuthorizationRequest;
use crate::types::request::CLAIMS_PARAMETER;

/// Structured claims request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimsRequest {
    /// Claims requested in the ID token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<HashMap<String, Option<IndividualClaimRequest>>>,

    /// Claims requested from the UserInfo endpoint. Not used for ID tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo: Option<HashMap<String, Option<IndividualClaimRequest>>>,
}

/// Per-claim request options. A bare `null` requests the claim voluntarily.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualClaimRequest {
    /// Whether the client marks the claim as essential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,

    /// Requested specific value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Requested set of acceptable values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl ClaimsRequest {
    /// Parses a JSON claims request.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `raw` is not a valid claims request object.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Extracts the claims request from the request parameters.
    ///
    /// A malformed value is logged and treated as if no claims were requested.
    #[must_use]
    pub fn from_request(request: &AuthorizationRequest) -> Option<Self> {
        let raw = request.parameter(CLAIMS_PARAMETER)?;

        match Self::parse(raw) {
            Ok(claims_request) => Some(claims_request),
            Err(e) => {
                tracing::warn!(
                    client_id = %request.client_id,
                    error = %e,
                    "Ignoring malformed claims request parameter"
                );
                None
            }
        }
    }

    /// Names of the claims requested for the ID token.
    pub fn id_token_claims(&self) -> impl Iterator<Item = &str> {
        self.id_token
            .iter()
            .flat_map(|claims| claims.keys().map(String::as_str))
    }

    /// Returns `true` if `claim` is requested for the ID token as essential.
    #[must_use]
    pub fn is_essential(&self, claim: &str) -> bool {
        self.id_token
            .as_ref()
            .and_then(|claims| claims.get(claim))
            .and_then(Option::as_ref)
            .and_then(|request| request.essential)
            .unwrap_or(false)
    }
}
