//! OpenID Connect ID token issuance.
//!
//! - [`standard`] - Standard claim names and the scope-to-claims table
//! - [`claims_request`] - Parsing of the `claims` request parameter
//! - [`resolver`] - Computation of the ID token claim set
//! - [`service`] - Issuance: certificate and claims resolution, then signing

pub mod claims_request;
pub mod resolver;
pub mod service;
pub mod standard;

pub use claims_request::{ClaimsRequest, IndividualClaimRequest};
pub use resolver::{ClaimsResolver, IdTokenClaims};
pub use service::IdTokenService;
pub use standard::{SCOPE_CLAIMS, Scope, StandardClaims, scope_claims};

/// ID token lifetime in seconds (4 hours).
pub const ID_TOKEN_LIFETIME_SECS: i64 = 14400;
