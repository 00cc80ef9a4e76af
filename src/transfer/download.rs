//! File download
//!
//! Streams a regular file to the client as an attachment.

use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use log::info;
use std::io::ErrorKind;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::StorageError;
use crate::storage::DownloadTarget;

/// Builds a streaming response for `target`
pub async fn stream_file(target: DownloadTarget) -> Result<Response, StorageError> {
    let file = File::open(&target.file_path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            StorageError::NotFound(target.file_name.clone())
        } else {
            StorageError::from(e)
        }
    })?;

    info!(
        "Sending {} ({} bytes)",
        target.file_path.display(),
        target.size
    );

    let disposition = HeaderValue::from_str(&content_disposition(&target.file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(target.size)),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body).into_response())
}

/// `attachment` disposition with an ASCII fallback name and the exact UTF-8 name
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}
