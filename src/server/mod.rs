//! Server core functionality
//!
//! This module contains the server bootstrap and the shared request context.

pub mod core;
pub mod state;

pub use self::core::Server;
pub use state::{AppState, SharedState};
