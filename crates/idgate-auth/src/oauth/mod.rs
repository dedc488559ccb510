//! OAuth 2.0 authorization code flow.
//!
//! - [`code`] - The authorization code model
//! - [`service`] - Issuing and redeeming codes against a storage backend

pub mod code;
pub mod service;

pub use code::AuthorizationCode;
pub use service::AuthorizationCodeService;
