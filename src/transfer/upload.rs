//! File upload
//!
//! Streams a multipart field into a randomly named file in the staging
//! directory and renames it over the destination once the whole body has
//! arrived. The staging directory lives outside every user tree.

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use log::{error, info};
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;
use crate::storage::UploadTarget;

const STAGED_PREFIX: &str = "upload-";

/// Receives one uploaded file. Returns the number of bytes stored.
///
/// On any failure the staged file is removed and an existing file at the
/// destination is left untouched.
pub async fn receive_upload(
    field: &mut Field<'_>,
    target: &UploadTarget,
    staging_dir: &Path,
    max_bytes: u64,
) -> Result<u64, StorageError> {
    let (file, staged) = create_staged(staging_dir)?;
    info!(
        "Starting upload: {} -> {}",
        staged.display(),
        target.file_path.display()
    );

    // Dropping `staged` on an early return deletes it
    let total = match write_staged(field, file, max_bytes).await {
        Ok(total) => total,
        Err(e) => {
            error!("Upload of {} failed: {}", target.virtual_path, e);
            return Err(e);
        }
    };

    commit(staged, &target.file_path)?;

    info!("Stored {} ({} bytes)", target.virtual_path, total);
    Ok(total)
}

fn create_staged(staging_dir: &Path) -> Result<(File, TempPath), StorageError> {
    let staged = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .tempfile_in(staging_dir)
        .map_err(|e| {
            error!(
                "Failed to create staging file in {}: {}",
                staging_dir.display(),
                e
            );
            StorageError::from(e)
        })?;

    let (file, path) = staged.into_parts();
    Ok((File::from_std(file), path))
}

/// Renames the staged file over `destination`; on failure the staged file is removed
fn commit(staged: TempPath, destination: &Path) -> Result<(), StorageError> {
    staged.persist(destination).map_err(|e| {
        error!(
            "Failed to move {} into place at {}: {}",
            e.path.display(),
            destination.display(),
            e.error
        );
        StorageError::from(e.error)
    })
}

async fn write_staged(
    field: &mut Field<'_>,
    mut staged_file: File,
    max_bytes: u64,
) -> Result<u64, StorageError> {
    let mut total_bytes_received = 0u64;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_failure(e, max_bytes))?
    {
        // Check size limit before writing
        total_bytes_received += chunk.len() as u64;
        if total_bytes_received > max_bytes {
            return Err(StorageError::TooLarge(max_bytes));
        }

        staged_file.write_all(&chunk).await?;
    }

    staged_file.flush().await?;
    Ok(total_bytes_received)
}

fn multipart_failure(err: MultipartError, max_bytes: u64) -> StorageError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StorageError::TooLarge(max_bytes)
    } else {
        StorageError::IoError(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            err.body_text(),
        ))
    }
}
