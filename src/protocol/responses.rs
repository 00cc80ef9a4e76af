//! JSON response bodies
//!
//! Every JSON endpoint answers with `{success, msg}`; the listing adds `files`.

use axum::Json;
use serde::Serialize;

use crate::storage::FileEntry;

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub msg: String,
}

impl ApiResponse {
    pub fn ok(msg: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            msg: msg.into(),
        })
    }

    pub fn failure(msg: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            msg: msg.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub files: Vec<FileEntry>,
}

impl ListResponse {
    pub fn new(files: Vec<FileEntry>) -> Json<Self> {
        Json(Self {
            success: true,
            files,
        })
    }
}
