//! Error handlers
//!
//! Maps drive errors onto HTTP status codes and `{success:false,msg}` bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};

use crate::error::types::{AuthError, DriveError, StorageError};
use crate::protocol::responses::ApiResponse;

/// Log a drive error at a level matching its status
pub fn handle_error(err: &DriveError) {
    let status = error_to_status(err);
    if status.is_server_error() {
        error!("Drive Server Error ({}): {}", status.as_u16(), err);
    } else {
        warn!("Request rejected ({}): {}", status.as_u16(), err);
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &DriveError) -> StatusCode {
    match err {
        DriveError::Auth(e) => match e {
            AuthError::EmptyCredentials | AuthError::InvalidUsername(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateUser(_) => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DriveError::Storage(e) => match e {
            StorageError::NotFound(_) | StorageError::NotADirectory(_) | StorageError::NotAFile(_) => {
                StatusCode::NOT_FOUND
            }
            StorageError::InvalidName(_)
            | StorageError::PathTraversal(_)
            | StorageError::AlreadyExists(_)
            | StorageError::DestinationInvalid(_)
            | StorageError::RootProtected
            | StorageError::MissingField(_) => StatusCode::BAD_REQUEST,
            StorageError::DirectoryNotEmpty(_) => StatusCode::CONFLICT,
            StorageError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DriveError::BadRequest(_) => StatusCode::BAD_REQUEST,
        DriveError::Internal(_) | DriveError::IoError(_) | DriveError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Message shown to the client; server-side details stay in the log
pub fn client_message(err: &DriveError) -> String {
    match err {
        DriveError::Auth(AuthError::Database(_)) => "Credential store unavailable".into(),
        DriveError::Storage(StorageError::IoError(_)) => "Operation failed".into(),
        DriveError::Internal(_) | DriveError::IoError(_) | DriveError::Config(_) => {
            "Internal server error".into()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for DriveError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let status = error_to_status(&self);
        (status, ApiResponse::failure(client_message(&self))).into_response()
    }
}
