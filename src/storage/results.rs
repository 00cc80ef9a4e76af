//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::path::PathBuf;

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "isDir")]
    pub is_dir: bool,
}

/// Where a completed upload lands
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub file_path: PathBuf,
    pub virtual_path: String,
}

/// A regular file ready to be streamed to the client
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub file_path: PathBuf,
    pub file_name: String,
    pub size: u64,
}
