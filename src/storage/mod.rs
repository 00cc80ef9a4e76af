//! File system storage management
//!
//! Handles sandbox confinement and the file operations behind every route.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{
    delete_entry, list_directory, make_directory, move_entry, prepare_upload, rename_entry,
    resolve_download,
};
pub use results::{DownloadTarget, FileEntry, UploadTarget};
pub use validation::{confine, split_user_path, validate_entry_name};
