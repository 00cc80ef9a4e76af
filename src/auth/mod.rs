//! Authentication system
//!
//! Handles user registration, credential validation and the credential store.

pub mod credentials;
pub mod validator;

pub use credentials::CredentialStore;
pub use validator::{authenticate, register, validate_username};
