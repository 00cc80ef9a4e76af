//! Session registry
//!
//! Server-side map from opaque session tokens to usernames, used when the
//! server runs in `session` identity mode.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct SessionEntry {
    username: String,
    expires_at: Instant,
}

/// Registry for tracking issued sessions
pub struct SessionRegistry {
    sessions: HashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh token for `username`
    pub fn issue(&mut self, username: &str) -> String {
        self.prune_expired();

        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                username: username.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Username behind a live token; expired tokens are dropped on sight
    pub fn resolve(&mut self, token: &str) -> Option<String> {
        let expired = match self.sessions.get(token) {
            Some(entry) if Instant::now() < entry.expires_at => {
                return Some(entry.username.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.sessions.remove(token);
        }
        None
    }

    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn prune_expired(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, entry| now < entry.expires_at);
    }
}
