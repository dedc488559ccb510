//! Authorization codes.
//!
//! A code is issued during the authorize step and exchanged exactly once at
//! the token endpoint. Codes are 256-bit random values, base64url-encoded,
//! and expire after a short lifetime (60 seconds by default).

use std::collections::HashSet;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;

/// A pending authorization code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// Storage identifier. Assigned by the store on create when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The code value handed to the client.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// End user who authorized the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Redirect URI from the authorization request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Granted scopes.
    #[serde(default)]
    pub scopes: HashSet<String>,

    /// Issue instant, whole seconds.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Instant after which the code is treated as nonexistent.
    #[serde(with = "time::serde::rfc3339")]
    pub expire_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Creates a code with a freshly generated value, expiring `lifetime`
    /// from now.
    ///
    /// `created_at` is truncated to whole seconds so the value survives
    /// storage backends with coarser timestamp precision unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `lifetime` pushes the expiry
    /// outside the representable date range.
    pub fn new(client_id: impl Into<String>, lifetime: Duration) -> AuthResult<Self> {
        let now = OffsetDateTime::now_utc();
        let created_at = now - time::Duration::nanoseconds(i64::from(now.nanosecond()));
        let expire_at = time::Duration::try_from(lifetime)
            .ok()
            .and_then(|lifetime| created_at.checked_add(lifetime))
            .ok_or_else(|| {
                AuthError::configuration(format!(
                    "Authorization code lifetime {lifetime:?} is out of range"
                ))
            })?;

        Ok(Self {
            id: None,
            code: Self::generate_code(),
            client_id: client_id.into(),
            subject: None,
            redirect_uri: None,
            scopes: HashSet::new(),
            created_at,
            expire_at,
        })
    }

    /// Sets the end-user subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Sets the granted scopes.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Generates a new authorization code value.
    ///
    /// 32 bytes from the thread-local CSPRNG, base64url without padding
    /// (43 characters).
    #[must_use]
    pub fn generate_code() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the code expires after it was created.
    #[must_use]
    pub fn has_valid_lifetime(&self) -> bool {
        self.expire_at > self.created_at
    }

    /// Returns `true` if the code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Returns `true` if the code is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expire_at
    }
}
