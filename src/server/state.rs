//! Shared server context
//!
//! Built once at startup and handed to every request handler.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::CredentialStore;
use crate::config::ServerConfig;
use crate::session::SessionRegistry;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: ServerConfig,
    pub credentials: Mutex<CredentialStore>,
    pub sessions: Mutex<SessionRegistry>,
}

impl AppState {
    pub fn new(config: ServerConfig, credentials: CredentialStore) -> Self {
        let sessions = SessionRegistry::new(config.session_ttl());
        Self {
            config,
            credentials: Mutex::new(credentials),
            sessions: Mutex::new(sessions),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    /// Sandbox root of `username`
    pub fn user_root(&self, username: &str) -> PathBuf {
        self.config.user_root(username)
    }
}
