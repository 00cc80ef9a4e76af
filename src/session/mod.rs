//! Session identity
//!
//! Resolves which user a request acts as, and tracks server-side sessions.

pub mod identity;
pub mod registry;

pub use identity::{Identity, clear_identity, issue_identity, resolve_identity};
pub use registry::SessionRegistry;
