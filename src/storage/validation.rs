//! Path validation
//!
//! Confines client-supplied paths to a user's sandbox root and validates
//! entry names before they reach the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Characters that separate path segments in client input
const SEPARATORS: [char; 2] = ['/', '\\'];

/// Resolve `relative` against `user_root` and make sure the result stays inside it.
///
/// `..` segments are collapsed lexically; one that would climb above the root is
/// rejected. The deepest existing ancestor of the result is then canonicalised
/// and compared against the canonical root, so a symlink inside the sandbox
/// cannot lead out of it.
pub fn confine(user_root: &Path, relative: &str) -> Result<PathBuf, StorageError> {
    let mut resolved = user_root.to_path_buf();
    for segment in normalize_segments(relative)? {
        resolved.push(segment);
    }

    if !is_within(&resolved, user_root) {
        return Err(StorageError::PathTraversal(relative.to_string()));
    }

    check_real_location(user_root, &resolved, relative)?;

    Ok(resolved)
}

/// Lexically normalise a client path into plain segments.
fn normalize_segments(relative: &str) -> Result<Vec<&str>, StorageError> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in relative.split(SEPARATORS) {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(StorageError::PathTraversal(relative.to_string()));
                }
            }
            s if s.contains('\0') => {
                return Err(StorageError::InvalidName(relative.to_string()));
            }
            s => segments.push(s),
        }
    }

    Ok(segments)
}

/// Component-wise containment: `/base/alice2` is not within `/base/alice`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Whether `path` is the sandbox root itself
pub fn is_root(user_root: &Path, path: &Path) -> bool {
    path == user_root
}

fn check_real_location(
    user_root: &Path,
    resolved: &Path,
    relative: &str,
) -> Result<(), StorageError> {
    let canonical_root = user_root
        .canonicalize()
        .map_err(|_| StorageError::NotFound(display_path(relative)))?;

    // Walk up to the first component that exists on disk
    let mut probe = resolved;
    while fs::symlink_metadata(probe).is_err() {
        match probe.parent() {
            Some(parent) => probe = parent,
            None => break,
        }
    }

    let canonical = probe
        .canonicalize()
        .map_err(|_| StorageError::PathTraversal(relative.to_string()))?;

    if !canonical.starts_with(&canonical_root) {
        return Err(StorageError::PathTraversal(relative.to_string()));
    }

    Ok(())
}

/// Split the tail of a `/files/...` or `/download/...` URL into
/// `(username, relative_path)`.
pub fn split_user_path(tail: &str) -> (&str, &str) {
    let trimmed = tail.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((username, rest)) => (username, rest),
        None => (trimmed, ""),
    }
}

/// Validate a single directory entry name (new folder, rename target, upload name).
pub fn validate_entry_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidName("name cannot be empty".into()));
    }

    if name.contains(SEPARATORS) || name.contains('\0') || name == "." || name == ".." {
        return Err(StorageError::InvalidName(name.to_string()));
    }

    Ok(())
}

/// Client-facing rendering of a relative path
pub fn display_path(relative: &str) -> String {
    let trimmed = relative.trim_matches(SEPARATORS);
    format!("/{}", trimmed)
}
