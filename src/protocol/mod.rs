//! HTTP surface
//!
//! Route table, request handlers, JSON bodies and HTML pages.

pub mod handlers;
pub mod pages;
pub mod responses;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};

use crate::middleware::logging::log_request;
use crate::server::state::SharedState;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Builds the full route table around the shared state
pub fn router(state: SharedState) -> Router {
    let body_limit = usize::try_from(
        state
            .config
            .max_upload_bytes()
            .saturating_add(MULTIPART_OVERHEAD),
    )
    .unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/files/{*tail}", get(handlers::list_files))
        .route("/download/{*tail}", get(handlers::download))
        .route("/upload", post(handlers::upload))
        .route("/delete", post(handlers::delete))
        .route("/mkdir", post(handlers::mkdir))
        .route("/rename", post(handlers::rename))
        .route("/move", post(handlers::move_entry))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
