//! Claim set resolution for ID tokens.
//!
//! The resolved set is the registered claims (`sub`, `aud`, `iss`, `iat`,
//! `exp`) plus every profile attribute whose name is either authorized by a
//! granted scope or named in the `id_token` member of a claims request, and
//! whose value in the profile is non-null.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::oidc::ID_TOKEN_LIFETIME_SECS;
use crate::oidc::claims_request::ClaimsRequest;
use crate::oidc::standard::{StandardClaims, scope_claims};
use crate::types::request::NONCE_PARAMETER;
use crate::types::{AuthorizationRequest, User};

/// Claims embedded in an ID token.
///
/// Serializes to a flat JSON object. `iss` is always emitted, as `null`
/// when no issuer is configured. `sub` is omitted for client-only tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject (end-user identifier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audience (client ID).
    pub aud: String,

    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Nonce from the authorization request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Profile claims copied from the user.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl IdTokenClaims {
    /// Creates a claim set with only the registered claims, expiring
    /// [`ID_TOKEN_LIFETIME_SECS`] after `iat`.
    #[must_use]
    pub fn new(aud: impl Into<String>, iat: i64) -> Self {
        Self {
            sub: None,
            aud: aud.into(),
            iss: None,
            iat,
            exp: iat + ID_TOKEN_LIFETIME_SECS,
            nonce: None,
            additional: Map::new(),
        }
    }

    /// Value of a profile claim.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.additional.get(name)
    }

    /// Names of every claim that will appear in the serialized token.
    #[must_use]
    pub fn claim_names(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = [
            StandardClaims::AUD,
            StandardClaims::ISS,
            StandardClaims::IAT,
            StandardClaims::EXP,
        ]
        .into_iter()
        .collect();
        if self.sub.is_some() {
            names.insert(StandardClaims::SUB);
        }
        if self.nonce.is_some() {
            names.insert(StandardClaims::NONCE);
        }
        names.extend(self.additional.keys().map(String::as_str));
        names
    }
}

/// Computes the claim set of an ID token.
#[derive(Debug, Clone, Default)]
pub struct ClaimsResolver {
    issuer: Option<String>,
}

impl ClaimsResolver {
    /// Creates a resolver that stamps `issuer` into the `iss` claim.
    #[must_use]
    pub fn new(issuer: Option<String>) -> Self {
        Self { issuer }
    }

    /// Resolves the claim set issued now.
    #[must_use]
    pub fn resolve(&self, request: &AuthorizationRequest, user: Option<&User>) -> IdTokenClaims {
        self.resolve_at(request, user, OffsetDateTime::now_utc())
    }

    /// Resolves the claim set as if issued at `issued_at`.
    ///
    /// Without a request subject the token is client-only: `sub` is omitted
    /// and no profile claims are attempted. With a subject, `sub` is the
    /// user's id when a user is supplied, otherwise the request subject.
    #[must_use]
    pub fn resolve_at(
        &self,
        request: &AuthorizationRequest,
        user: Option<&User>,
        issued_at: OffsetDateTime,
    ) -> IdTokenClaims {
        let mut claims = IdTokenClaims::new(request.client_id.clone(), issued_at.unix_timestamp());
        claims.iss = self.issuer.clone();
        claims.nonce = request.parameter(NONCE_PARAMETER).map(str::to_string);

        let Some(subject) = request.subject.as_deref() else {
            return claims;
        };
        claims.sub = Some(user.map_or(subject, |u| u.id.as_str()).to_string());

        let Some(user) = user else {
            return claims;
        };

        let claims_request = ClaimsRequest::from_request(request);
        let requested = candidate_claims(request, claims_request.as_ref());

        for name in requested {
            if StandardClaims::is_reserved(name) {
                continue;
            }
            if let Some(value) = user.claim(name) {
                claims.additional.insert(name.to_string(), value.clone());
            }
        }

        claims
    }
}

/// Union of the claims authorized by the granted scopes and the claims
/// named under `id_token` in the claims request.
fn candidate_claims<'a>(
    request: &'a AuthorizationRequest,
    claims_request: Option<&'a ClaimsRequest>,
) -> HashSet<&'a str> {
    request
        .scopes
        .iter()
        .flat_map(|scope| scope_claims(scope).iter().copied())
        .chain(claims_request.into_iter().flat_map(|r| r.id_token_claims()))
        .collect()
}
