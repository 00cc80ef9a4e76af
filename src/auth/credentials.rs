//! Credential storage and management
//!
//! A single SQLite table of username/password pairs. Passwords are stored and
//! compared as plain text.

use log::warn;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::fs;
use std::path::Path;

use crate::error::AuthError;

const CREATE_USERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL
    )";

/// Persistent username/password table
pub struct CredentialStore {
    conn: Connection,
}

impl CredentialStore {
    /// Open or create the credential database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AuthError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    warn!("Failed to create {}: {}", parent.display(), e);
                    AuthError::Database(rusqlite::Error::InvalidPath(parent.to_path_buf()))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self, AuthError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AuthError> {
        conn.execute(CREATE_USERS_TABLE, [])?;
        Ok(Self { conn })
    }

    /// Insert a new user row; fails with `DuplicateUser` if the name is taken.
    pub fn insert_user(&self, username: &str, password: &str) -> Result<(), AuthError> {
        match self.conn.execute(
            "INSERT INTO users (username, password) VALUES (?1, ?2)",
            params![username, password],
        ) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(AuthError::DuplicateUser(username.to_string()))
            }
            Err(e) => Err(AuthError::Database(e)),
        }
    }

    /// Remove a user row. Only used to undo a registration that could not
    /// create the user's directory.
    pub(crate) fn remove_user(&self, username: &str) -> Result<(), AuthError> {
        self.conn
            .execute("DELETE FROM users WHERE username = ?1", params![username])?;
        Ok(())
    }

    /// Stored password for a user, if the user exists
    pub fn stored_password(&self, username: &str) -> Result<Option<String>, AuthError> {
        let password = self
            .conn
            .query_row(
                "SELECT password FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(password)
    }

    /// Case-sensitive exact match of the stored password
    pub fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        match self.stored_password(username)? {
            Some(stored) if stored == password => Ok(()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    #[cfg(test)]
    pub(crate) fn user_exists(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.stored_password(username)?.is_some())
    }

    pub fn user_count(&self) -> Result<u64, AuthError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_insert_and_verify() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.insert_user("alice", "alice123").unwrap();

        assert!(store.verify("alice", "alice123").is_ok());
        assert!(matches!(
            store.verify("alice", "ALICE123"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            store.verify("nobody", "alice123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_duplicate_user() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.insert_user("bob", "one").unwrap();

        let err = store.insert_user("bob", "two").unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser(_)));
        assert_eq!(store.user_count().unwrap(), 1);
        assert_eq!(store.stored_password("bob").unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn test_remove_user() {
        let store = CredentialStore::open_in_memory().unwrap();
        store.insert_user("carol", "pw").unwrap();
        store.remove_user("carol").unwrap();
        assert!(!store.user_exists("carol").unwrap());
    }

    #[test]
    fn test_open_persists_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/users.db");

        {
            let store = CredentialStore::open(&path).unwrap();
            store.insert_user("dave", "pw").unwrap();
        }

        let store = CredentialStore::open(&path).unwrap();
        assert!(store.verify("dave", "pw").is_ok());
    }
}
