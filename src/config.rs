//! Configuration management for RAX Drive
//!
//! Values are layered: built-in defaults, then an optional `config.toml` in the
//! working directory, then `RAX_DRIVE_*` environment variables. The result is
//! loaded once at startup and never mutated afterwards.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_ROOT: &str = "./userfiles";
const DEFAULT_DATABASE_PATH: &str = "./users.db";
const DEFAULT_STAGING_DIR: &str = "./staging";
const DEFAULT_MAX_UPLOAD_MB: u64 = 1024;
const DEFAULT_MAX_USERNAME_LENGTH: usize = 64;
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// How a request's identity is derived from its cookies.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    /// The `username` cookie names the user and is trusted verbatim.
    Cookie,
    /// Login issues an opaque token that is looked up server-side.
    Session,
}

/// Who may list and download a given user's tree.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Only the owner, identified by a resolved identity.
    OwnerOnly,
    /// Anyone who knows the username, identified or not.
    Shared,
}

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    /// Base directory holding one subdirectory per user
    pub storage_root: String,

    /// SQLite file holding the credential table
    pub database_path: String,

    /// Scratch directory uploads are written to before being moved into a
    /// user tree. Must sit outside `storage_root`, ideally on the same filesystem.
    pub staging_dir: String,

    /// Upper bound for a single uploaded file
    pub max_upload_mb: u64,

    pub max_username_length: usize,

    pub identity_mode: IdentityMode,

    /// Lifetime of a server-side session (session identity mode only)
    pub session_ttl_secs: u64,

    pub access_policy: AccessPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            storage_root: DEFAULT_STORAGE_ROOT.to_string(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            staging_dir: DEFAULT_STAGING_DIR.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            max_username_length: DEFAULT_MAX_USERNAME_LENGTH,
            identity_mode: IdentityMode::Cookie,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            access_policy: AccessPolicy::OwnerOnly,
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, `config.toml` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("storage_root", DEFAULT_STORAGE_ROOT)?
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("staging_dir", DEFAULT_STAGING_DIR)?
            .set_default("max_upload_mb", DEFAULT_MAX_UPLOAD_MB as i64)?
            .set_default("max_username_length", DEFAULT_MAX_USERNAME_LENGTH as i64)?
            .set_default("identity_mode", "cookie")?
            .set_default("session_ttl_secs", DEFAULT_SESSION_TTL_SECS as i64)?
            .set_default("access_policy", "owner_only")?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("RAX_DRIVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "storage_root cannot be empty".into(),
            ));
        }

        if self.database_path.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "database_path cannot be empty".into(),
            ));
        }

        if self.staging_dir.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "staging_dir cannot be empty".into(),
            ));
        }

        if self.staging_dir_path().starts_with(self.storage_root_path()) {
            return Err(config::ConfigError::Message(
                "staging_dir must be outside storage_root".into(),
            ));
        }

        if self.max_upload_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_mb must be greater than 0".into(),
            ));
        }

        if self.max_upload_mb.checked_mul(1024 * 1024).is_none() {
            return Err(config::ConfigError::Message(
                "max_upload_mb is too large".into(),
            ));
        }

        if self.max_username_length == 0 {
            return Err(config::ConfigError::Message(
                "max_username_length must be greater than 0".into(),
            ));
        }

        if self.identity_mode == IdentityMode::Session && self.session_ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "session_ttl_secs must be greater than 0 in session mode".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    pub fn database_path(&self) -> &Path {
        Path::new(&self.database_path)
    }

    pub fn staging_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.staging_dir)
    }

    /// Root directory of a single user's sandbox
    pub fn user_root(&self, username: &str) -> PathBuf {
        self.storage_root_path().join(username)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_socket(), "127.0.0.1:8080");
        assert_eq!(config.identity_mode, IdentityMode::Cookie);
        assert_eq!(config.access_policy, AccessPolicy::OwnerOnly);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_storage_root() {
        let config = ServerConfig {
            storage_root: "  ".into(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_upload_limit() {
        let config = ServerConfig {
            max_upload_mb: u64::MAX / 1024,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.max_upload_bytes(), u64::MAX);
    }

    #[test]
    fn test_validate_rejects_staging_inside_storage_root() {
        let config = ServerConfig {
            storage_root: "/srv/drive".into(),
            staging_dir: "/srv/drive/alice".into(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            storage_root: "/srv/drive".into(),
            staging_dir: "/srv/drive-staging".into(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_mode_requires_ttl() {
        let config = ServerConfig {
            identity_mode: IdentityMode::Session,
            session_ttl_secs: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_user_root_and_upload_limit() {
        let config = ServerConfig {
            storage_root: "/srv/drive".into(),
            max_upload_mb: 2,
            ..ServerConfig::default()
        };
        assert_eq!(config.user_root("alice"), PathBuf::from("/srv/drive/alice"));
        assert_eq!(config.max_upload_bytes(), 2 * 1024 * 1024);
    }
}
