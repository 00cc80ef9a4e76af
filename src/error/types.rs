//! Error types
//!
//! Defines domain-specific error types for each module of the drive server.

use std::fmt;
use std::io;

/// Coarse failure classes reported to clients and used by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad credentials, duplicate username, or access to another user's tree
    AuthFailure,
    /// No usable identity on the request
    NotAuthenticated,
    /// A resolved path falls outside the user's sandbox
    PathEscape,
    NotFound,
    /// Malformed input: empty or invalid names, missing form fields
    BadRequest,
    /// Syscall-level failure
    OperationFailed,
}

/// Authentication module errors
#[derive(Debug)]
pub enum AuthError {
    EmptyCredentials,
    InvalidUsername(String),
    DuplicateUser(String),
    InvalidCredentials,
    NotAuthenticated,
    AccessDenied(String),
    Database(rusqlite::Error),
}

impl AuthError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AuthError::EmptyCredentials | AuthError::InvalidUsername(_) => {
                ErrorCategory::BadRequest
            }
            AuthError::DuplicateUser(_)
            | AuthError::InvalidCredentials
            | AuthError::AccessDenied(_) => ErrorCategory::AuthFailure,
            AuthError::NotAuthenticated => ErrorCategory::NotAuthenticated,
            AuthError::Database(_) => ErrorCategory::OperationFailed,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::EmptyCredentials => write!(f, "Username and password cannot be empty"),
            AuthError::InvalidUsername(reason) => write!(f, "Invalid username: {}", reason),
            AuthError::DuplicateUser(u) => write!(f, "Username already exists: {}", u),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::NotAuthenticated => write!(f, "Not logged in"),
            AuthError::AccessDenied(u) => write!(f, "Access denied to files of {}", u),
            AuthError::Database(e) => write!(f, "Credential store error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(error: rusqlite::Error) -> Self {
        AuthError::Database(error)
    }
}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    NotFound(String),
    NotADirectory(String),
    NotAFile(String),
    InvalidName(String),
    PathTraversal(String),
    AlreadyExists(String),
    DirectoryNotEmpty(String),
    DestinationInvalid(String),
    RootProtected,
    MissingField(String),
    TooLarge(u64),
    IoError(io::Error),
}

impl StorageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StorageError::NotFound(_) | StorageError::NotADirectory(_) | StorageError::NotAFile(_) => {
                ErrorCategory::NotFound
            }
            StorageError::PathTraversal(_) => ErrorCategory::PathEscape,
            StorageError::InvalidName(_)
            | StorageError::AlreadyExists(_)
            | StorageError::DestinationInvalid(_)
            | StorageError::RootProtected
            | StorageError::MissingField(_)
            | StorageError::TooLarge(_) => ErrorCategory::BadRequest,
            StorageError::DirectoryNotEmpty(_) | StorageError::IoError(_) => {
                ErrorCategory::OperationFailed
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::NotAFile(p) => write!(f, "Not a file: {}", p),
            StorageError::InvalidName(n) => write!(f, "Invalid name: {}", n),
            StorageError::PathTraversal(p) => write!(f, "Invalid path: {}", p),
            StorageError::AlreadyExists(p) => write!(f, "Already exists: {}", p),
            StorageError::DirectoryNotEmpty(p) => write!(f, "Directory is not empty: {}", p),
            StorageError::DestinationInvalid(msg) => write!(f, "Invalid destination: {}", msg),
            StorageError::RootProtected => write!(f, "The home directory cannot be changed"),
            StorageError::MissingField(name) => write!(f, "Missing field: {}", name),
            StorageError::TooLarge(limit) => {
                write!(f, "File exceeds the upload limit of {} bytes", limit)
            }
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// General drive server error that encompasses all error types
#[derive(Debug)]
pub enum DriveError {
    Auth(AuthError),
    Storage(StorageError),
    BadRequest(String),
    Internal(String),
    IoError(io::Error),
    Config(config::ConfigError),
}

impl DriveError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DriveError::Auth(e) => e.category(),
            DriveError::Storage(e) => e.category(),
            DriveError::BadRequest(_) => ErrorCategory::BadRequest,
            DriveError::Internal(_) | DriveError::IoError(_) | DriveError::Config(_) => {
                ErrorCategory::OperationFailed
            }
        }
    }
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::Auth(e) => write!(f, "{}", e),
            DriveError::Storage(e) => write!(f, "{}", e),
            DriveError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            DriveError::Internal(msg) => write!(f, "Internal error: {}", msg),
            DriveError::IoError(e) => write!(f, "I/O error: {}", e),
            DriveError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for DriveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriveError::Auth(e) => Some(e),
            DriveError::Storage(e) => Some(e),
            DriveError::IoError(e) => Some(e),
            DriveError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AuthError> for DriveError {
    fn from(error: AuthError) -> Self {
        DriveError::Auth(error)
    }
}

impl From<StorageError> for DriveError {
    fn from(error: StorageError) -> Self {
        DriveError::Storage(error)
    }
}

impl From<io::Error> for DriveError {
    fn from(error: io::Error) -> Self {
        DriveError::IoError(error)
    }
}

impl From<config::ConfigError> for DriveError {
    fn from(error: config::ConfigError) -> Self {
        DriveError::Config(error)
    }
}
