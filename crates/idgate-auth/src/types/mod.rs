//! Core types consumed by issuance and authorization code handling.

pub mod client;
pub mod request;
pub mod user;

pub use client::Client;
pub use request::AuthorizationRequest;
pub use user::User;
