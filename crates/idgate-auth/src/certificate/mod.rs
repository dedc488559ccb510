//! Signing certificate providers and their per-client resolution.
//!
//! - [`provider`] - A named signing key
//! - [`manager`] - Lookup contract for providers, plus an in-memory manager
//! - [`registry`] - Client-to-provider resolution with default fallback

pub mod manager;
pub mod provider;
pub mod registry;

pub use manager::{CertificateManager, InMemoryCertificateManager};
pub use provider::CertificateProvider;
pub use registry::CertificateRegistry;
