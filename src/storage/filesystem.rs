//! File system operations
//!
//! Creation and removal of the per-user sandbox directories.

use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};

/// Create the storage root if it does not exist yet
pub fn ensure_storage_root(storage_root: &Path) -> Result<()> {
    fs::create_dir_all(storage_root)
}

/// Create the sandbox directory of a newly registered user
pub fn create_user_root(storage_root: &Path, username: &str) -> Result<PathBuf> {
    let user_root = storage_root.join(username);
    fs::create_dir_all(&user_root)?;
    Ok(user_root)
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}
