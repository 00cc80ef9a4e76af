//! Authentication validator
//!
//! Registration and login on top of the credential store, plus the username
//! rules shared with identity resolution and the file routes.

use log::{info, warn};
use std::path::{Path, PathBuf};

use super::credentials::CredentialStore;
use crate::error::{AuthError, DriveError};
use crate::storage::filesystem::create_user_root;

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// A username doubles as a directory name, so it must be a single plain path segment.
pub fn validate_username(username: &str, max_length: usize) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::EmptyCredentials);
    }

    if username.contains(['/', '\\']) {
        return Err(AuthError::InvalidUsername(
            "username contains invalid characters".into(),
        ));
    }

    if username == "." || username == ".." || username.trim() != username {
        return Err(AuthError::InvalidUsername(username.to_string()));
    }

    if !is_valid_input(username, max_length) {
        return Err(AuthError::InvalidUsername("invalid username format".into()));
    }

    Ok(())
}

/// Registers a user and creates their sandbox directory under `storage_root`.
///
/// If the directory cannot be created the row is removed again, so a failed
/// registration leaves the credential store as it was.
pub fn register(
    store: &CredentialStore,
    storage_root: &Path,
    username: &str,
    password: &str,
    max_username_length: usize,
) -> Result<PathBuf, DriveError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::EmptyCredentials.into());
    }

    validate_username(username, max_username_length)?;

    store.insert_user(username, password)?;

    match create_user_root(storage_root, username) {
        Ok(user_root) => {
            info!("Registered user {} (root: {})", username, user_root.display());
            Ok(user_root)
        }
        Err(e) => {
            warn!("Failed to create root for {}: {}", username, e);
            store.remove_user(username)?;
            Err(DriveError::IoError(e))
        }
    }
}

/// Checks a username/password pair against the store.
pub fn authenticate(store: &CredentialStore, username: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::EmptyCredentials);
    }

    store.verify(username, password)
}
