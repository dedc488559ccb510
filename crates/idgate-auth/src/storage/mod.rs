//! Storage for authorization codes.
//!
//! The trait lives here together with an in-memory implementation and a
//! background reaper. The PostgreSQL backend is provided by the
//! `idgate-auth-postgres` crate.

pub mod authorization_code;
pub mod memory;
pub mod reaper;

pub use authorization_code::AuthorizationCodeStorage;
pub use memory::InMemoryAuthorizationCodeStorage;
pub use reaper::spawn_reaper;
