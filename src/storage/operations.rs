//! Storage operations
//!
//! Handles the file system side of every drive operation: list, upload,
//! download, delete, mkdir, rename and move. Each operation confines its
//! client-supplied paths to the user root before touching disk.

use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::StorageError;
use crate::storage::filesystem::directory_exists;
use crate::storage::results::{DownloadTarget, FileEntry, UploadTarget};
use crate::storage::validation::{confine, display_path, is_root, validate_entry_name};

/// Lists the immediate children of a directory, in the order the OS returns them
pub fn list_directory(user_root: &Path, relative: &str) -> Result<Vec<FileEntry>, StorageError> {
    let real_path = confine(user_root, relative)?;

    let metadata =
        fs::metadata(&real_path).map_err(|_| StorageError::NotFound(display_path(relative)))?;
    if !metadata.is_dir() {
        return Err(StorageError::NotADirectory(display_path(relative)));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&real_path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        // Follows symlinks; a dangling link lists as a file
        let is_dir = fs::metadata(entry.path())
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(FileEntry { name, is_dir });
    }

    Ok(entries)
}

/// Prepares for file storage
///
/// Checks the destination directory and file name. The bytes themselves are
/// staged outside the user tree by the transfer layer.
pub fn prepare_upload(
    user_root: &Path,
    relative_dir: &str,
    filename: &str,
) -> Result<UploadTarget, StorageError> {
    validate_entry_name(filename)?;

    let dest_dir = confine(user_root, relative_dir)?;
    if !directory_exists(&dest_dir) {
        return Err(StorageError::DestinationInvalid(
            "upload directory does not exist".into(),
        ));
    }

    let file_path = dest_dir.join(filename);
    if file_path.is_dir() {
        return Err(StorageError::DestinationInvalid(format!(
            "{} is a directory",
            filename
        )));
    }

    let virtual_path = display_path(&format!("{}/{}", relative_dir, filename));

    Ok(UploadTarget {
        file_path,
        virtual_path,
    })
}

/// Prepares for file retrieval
pub fn resolve_download(user_root: &Path, relative: &str) -> Result<DownloadTarget, StorageError> {
    let file_path = confine(user_root, relative)?;

    let metadata =
        fs::metadata(&file_path).map_err(|_| StorageError::NotFound(display_path(relative)))?;
    if !metadata.is_file() {
        return Err(StorageError::NotAFile(display_path(relative)));
    }

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| StorageError::NotAFile(display_path(relative)))?;

    Ok(DownloadTarget {
        file_path,
        file_name,
        size: metadata.len(),
    })
}

/// Deletes a file, or a directory if it is empty
pub fn delete_entry(user_root: &Path, relative: &str) -> Result<(), StorageError> {
    let target = confine(user_root, relative)?;
    if is_root(user_root, &target) {
        return Err(StorageError::RootProtected);
    }

    let metadata = fs::symlink_metadata(&target)
        .map_err(|_| StorageError::NotFound(display_path(relative)))?;

    let result = if metadata.is_dir() {
        fs::remove_dir(&target)
    } else {
        fs::remove_file(&target)
    };

    match result {
        Ok(()) => {
            info!(
                "Deleted {} (real: {})",
                display_path(relative),
                target.display()
            );
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
            Err(StorageError::DirectoryNotEmpty(display_path(relative)))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(StorageError::NotFound(display_path(relative)))
        }
        Err(e) => Err(StorageError::from(e)),
    }
}

/// Creates a single directory below an existing parent
pub fn make_directory(user_root: &Path, parent: &str, name: &str) -> Result<(), StorageError> {
    validate_entry_name(name)?;

    let parent_path = confine(user_root, parent)?;
    let target = parent_path.join(name);

    match fs::create_dir(&target) {
        Ok(()) => {
            info!("Created directory {} (real: {})", name, target.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StorageError::AlreadyExists(
            display_path(&format!("{}/{}", parent, name)),
        )),
        Err(e) => Err(StorageError::from(e)),
    }
}

/// Renames an entry in place, keeping it in the same parent directory
pub fn rename_entry(user_root: &Path, relative: &str, new_name: &str) -> Result<(), StorageError> {
    validate_entry_name(new_name)?;

    let source = confine(user_root, relative)?;
    if is_root(user_root, &source) {
        return Err(StorageError::RootProtected);
    }

    if fs::symlink_metadata(&source).is_err() {
        return Err(StorageError::NotFound(display_path(relative)));
    }

    let parent = source
        .parent()
        .ok_or_else(|| StorageError::NotFound(display_path(relative)))?;
    let target = parent.join(new_name);

    if fs::symlink_metadata(&target).is_ok() {
        return Err(StorageError::AlreadyExists(new_name.to_string()));
    }

    fs::rename(&source, &target)?;

    info!(
        "Renamed {} to {} (real: {})",
        display_path(relative),
        new_name,
        target.display()
    );
    Ok(())
}

/// Moves an entry into an existing directory, keeping its name
pub fn move_entry(user_root: &Path, relative: &str, destination: &str) -> Result<(), StorageError> {
    let source = confine(user_root, relative)?;
    if is_root(user_root, &source) {
        return Err(StorageError::RootProtected);
    }

    if fs::symlink_metadata(&source).is_err() {
        return Err(StorageError::NotFound(display_path(relative)));
    }

    let dest_dir = confine(user_root, destination)?;
    if !directory_exists(&dest_dir) {
        return Err(StorageError::DestinationInvalid(format!(
            "destination directory {} not found",
            display_path(destination)
        )));
    }

    if dest_dir.starts_with(&source) {
        return Err(StorageError::DestinationInvalid(
            "cannot move a directory into itself".into(),
        ));
    }

    let name = source
        .file_name()
        .ok_or_else(|| StorageError::NotFound(display_path(relative)))?;
    let target = dest_dir.join(name);

    if fs::symlink_metadata(&target).is_ok() {
        return Err(StorageError::AlreadyExists(display_path(&format!(
            "{}/{}",
            destination,
            name.to_string_lossy()
        ))));
    }

    fs::rename(&source, &target)?;

    info!(
        "Moved {} to {} (real: {})",
        display_path(relative),
        display_path(destination),
        target.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, PathBuf) {
        let base = TempDir::new().unwrap();
        let root = base.path().join("alice");
        fs::create_dir_all(&root).unwrap();
        (base, root)
    }

    fn names(entries: &[FileEntry]) -> Vec<String> {
        let mut names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_list_directory_reports_kind() {
        let (_base, root) = sandbox();
        fs::write(root.join("report.txt"), "hello").unwrap();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join(".big.iso.rax-part"), "partial").unwrap();

        let entries = list_directory(&root, "").unwrap();
        assert_eq!(names(&entries), vec![".big.iso.rax-part", "docs", "report.txt"]);
        assert!(entries.contains(&FileEntry {
            name: "report.txt".into(),
            is_dir: false
        }));
        assert!(entries.contains(&FileEntry {
            name: "docs".into(),
            is_dir: true
        }));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_directory_follows_symlinked_directory() {
        let (_base, root) = sandbox();
        fs::create_dir(root.join("docs")).unwrap();
        std::os::unix::fs::symlink(root.join("docs"), root.join("shortcut")).unwrap();
        std::os::unix::fs::symlink(root.join("gone"), root.join("dangling")).unwrap();

        let entries = list_directory(&root, "").unwrap();
        assert!(entries.contains(&FileEntry {
            name: "shortcut".into(),
            is_dir: true
        }));
        assert!(entries.contains(&FileEntry {
            name: "dangling".into(),
            is_dir: false
        }));
    }

    #[test]
    fn test_list_directory_failures() {
        let (_base, root) = sandbox();
        fs::write(root.join("a.txt"), "x").unwrap();

        let err = list_directory(&root, "missing").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = list_directory(&root, "a.txt").unwrap_err();
        assert!(matches!(err, StorageError::NotADirectory(_)));

        let err = list_directory(&root, "../").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::PathEscape);
    }

    #[test]
    fn test_prepare_upload() {
        let (_base, root) = sandbox();
        fs::create_dir(root.join("docs")).unwrap();

        let target = prepare_upload(&root, "docs", "report.txt").unwrap();
        assert_eq!(target.file_path, root.join("docs/report.txt"));
        assert_eq!(target.virtual_path, "/docs/report.txt");

        let err = prepare_upload(&root, "nowhere", "report.txt").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);

        let err = prepare_upload(&root, "", "../report.txt").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);

        let err = prepare_upload(&root, "", "docs").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
    }

    #[test]
    fn test_resolve_download() {
        let (_base, root) = sandbox();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs/a.txt"), "hello").unwrap();

        let target = resolve_download(&root, "docs/a.txt").unwrap();
        assert_eq!(target.file_name, "a.txt");
        assert_eq!(target.size, 5);

        let err = resolve_download(&root, "docs").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = resolve_download(&root, "docs/missing.txt").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_delete_file_and_empty_directory() {
        let (_base, root) = sandbox();
        fs::write(root.join("a.txt"), "x").unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        delete_entry(&root, "a.txt").unwrap();
        delete_entry(&root, "empty").unwrap();
        assert!(!root.join("a.txt").exists());
        assert!(!root.join("empty").exists());

        let err = delete_entry(&root, "a.txt").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_delete_non_empty_directory_fails_and_keeps_contents() {
        let (_base, root) = sandbox();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs/keep.txt"), "keep").unwrap();

        let err = delete_entry(&root, "docs").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::OperationFailed);
        assert!(matches!(err, StorageError::DirectoryNotEmpty(_)));
        assert_eq!(fs::read_to_string(root.join("docs/keep.txt")).unwrap(), "keep");
    }

    #[test]
    fn test_delete_root_is_refused() {
        let (_base, root) = sandbox();
        let err = delete_entry(&root, "/").unwrap_err();
        assert!(matches!(err, StorageError::RootProtected));
        assert!(root.is_dir());
    }

    #[test]
    fn test_make_directory() {
        let (_base, root) = sandbox();
        make_directory(&root, "", "docs").unwrap();
        assert!(root.join("docs").is_dir());

        let err = make_directory(&root, "", "sub/dir").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);

        let err = make_directory(&root, "", "").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);

        let err = make_directory(&root, "", "docs").unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        // Non-recursive: parent must exist
        let err = make_directory(&root, "missing", "child").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::OperationFailed);
        assert!(!root.join("missing").exists());
    }

    #[test]
    fn test_rename_entry() {
        let (_base, root) = sandbox();
        fs::write(root.join("a.txt"), "a").unwrap();

        rename_entry(&root, "a.txt", "c.txt").unwrap();
        assert!(!root.join("a.txt").exists());
        assert_eq!(fs::read_to_string(root.join("c.txt")).unwrap(), "a");

        let err = rename_entry(&root, "missing.txt", "d.txt").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err = rename_entry(&root, "c.txt", "x/y").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
    }

    #[test]
    fn test_rename_collision_leaves_both_files() {
        let (_base, root) = sandbox();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b.txt"), "b").unwrap();

        let err = rename_entry(&root, "a.txt", "b.txt").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_move_entry() {
        let (_base, root) = sandbox();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();

        move_entry(&root, "a.txt", "docs").unwrap();
        assert!(!root.join("a.txt").exists());
        assert_eq!(fs::read_to_string(root.join("docs/a.txt")).unwrap(), "a");

        // Back up to the root
        move_entry(&root, "docs/a.txt", "/").unwrap();
        assert!(root.join("a.txt").exists());
    }

    #[test]
    fn test_move_to_missing_destination_keeps_source() {
        let (_base, root) = sandbox();
        fs::write(root.join("a.txt"), "a").unwrap();

        let err = move_entry(&root, "a.txt", "nowhere").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::BadRequest);
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "a");
    }

    #[test]
    fn test_move_directory_into_itself_is_refused() {
        let (_base, root) = sandbox();
        fs::create_dir_all(root.join("docs/inner")).unwrap();

        let err = move_entry(&root, "docs", "docs/inner").unwrap_err();
        assert!(matches!(err, StorageError::DestinationInvalid(_)));
        assert!(root.join("docs/inner").is_dir());
    }

    #[test]
    fn test_move_out_of_sandbox_is_refused() {
        let (base, root) = sandbox();
        fs::create_dir(base.path().join("bob")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();

        let err = move_entry(&root, "a.txt", "../bob").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::PathEscape);
        assert!(root.join("a.txt").exists());
    }
}
