//! Request handlers for the Rax Drive server.
//!
//! Each handler resolves the acting identity where required, confines every
//! client-supplied path through the storage layer, and answers with JSON,
//! HTML or a file stream.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Multipart, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use log::info;
use serde::Deserialize;

use crate::auth;
use crate::config::AccessPolicy;
use crate::error::{AuthError, DriveError, StorageError};
use crate::protocol::pages;
use crate::protocol::responses::{ApiResponse, ListResponse};
use crate::server::state::SharedState;
use crate::session::{Identity, clear_identity, issue_identity, resolve_identity};
use crate::storage;
use crate::transfer;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PathForm {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct MkdirForm {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub newname: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveForm {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub newpath: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub path: String,
}

/// Runs a blocking storage operation off the async workers.
async fn blocking<T, F>(task: F) -> Result<T, DriveError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| DriveError::Internal(format!("storage task failed: {}", e)))?
        .map_err(DriveError::from)
}

fn form_body<T>(form: Result<Form<T>, FormRejection>) -> Result<T, DriveError> {
    form.map(|Form(value)| value)
        .map_err(|rejection| DriveError::BadRequest(rejection.body_text()))
}

/// Under `owner_only`, only the user named in the URL may read their tree.
async fn authorize_read(
    state: &SharedState,
    jar: &CookieJar,
    owner: &str,
) -> Result<(), DriveError> {
    if state.config.access_policy == AccessPolicy::Shared {
        return Ok(());
    }

    let caller = resolve_identity(state, jar).await?;
    if caller != owner {
        return Err(AuthError::AccessDenied(owner.to_string()).into());
    }
    Ok(())
}

/// Splits a `/files/...` or `/download/...` tail and checks the username segment.
fn user_path(state: &SharedState, tail: &str) -> Result<(String, String), DriveError> {
    let (username, relative) = storage::split_user_path(tail);
    auth::validate_username(username, state.config.max_username_length)
        .map_err(|_| DriveError::BadRequest("Invalid path".into()))?;
    Ok((username.to_string(), relative.to_string()))
}

/// `GET /`: file manager page, or a redirect to the login page
pub async fn index(State(state): State<SharedState>, jar: CookieJar) -> Response {
    match resolve_identity(&state, &jar).await {
        Ok(username) => Html(pages::file_manager_page(&username)).into_response(),
        Err(_) => Redirect::to("/login").into_response(),
    }
}

/// `GET /login`
pub async fn login_page() -> Html<&'static str> {
    Html(pages::LOGIN_PAGE)
}

/// `POST /api/register`
pub async fn register(
    State(state): State<SharedState>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<Json<ApiResponse>, DriveError> {
    let form = form_body(form)?;

    let store = state.credentials.lock().await;
    auth::register(
        &store,
        &state.config.storage_root_path(),
        &form.username,
        &form.password,
        state.config.max_username_length,
    )?;

    Ok(ApiResponse::ok("Registration successful"))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Result<(CookieJar, Json<ApiResponse>), DriveError> {
    let form = form_body(form)?;

    {
        let store = state.credentials.lock().await;
        auth::authenticate(&store, &form.username, &form.password)?;
    }

    let jar = issue_identity(&state, jar, &form.username).await;
    info!("User {} logged in", form.username);

    Ok((jar, ApiResponse::ok("Login successful")))
}

/// `POST /api/logout`
pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse>) {
    let jar = clear_identity(&state, jar).await;
    (jar, ApiResponse::ok("Logged out"))
}

/// `GET /files/{username}/{relpath...}`
pub async fn list_files(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(tail): Path<String>,
) -> Result<Json<ListResponse>, DriveError> {
    let (username, relative) = user_path(&state, &tail)?;
    authorize_read(&state, &jar, &username).await?;

    let user_root = state.user_root(&username);
    let files = blocking(move || storage::list_directory(&user_root, &relative)).await?;

    Ok(ListResponse::new(files))
}

/// `GET /download/{username}/{relpath...}`
pub async fn download(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(tail): Path<String>,
) -> Result<Response, DriveError> {
    let (username, relative) = user_path(&state, &tail)?;
    authorize_read(&state, &jar, &username).await?;

    let user_root = state.user_root(&username);
    let target = blocking(move || storage::resolve_download(&user_root, &relative)).await?;

    Ok(transfer::stream_file(target).await?)
}

/// `POST /upload?path={relpath}` with multipart field `file`
pub async fn upload(
    State(state): State<SharedState>,
    Identity(username): Identity,
    Query(query): Query<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>, DriveError> {
    let mut multipart = multipart.map_err(|e| DriveError::BadRequest(e.body_text()))?;
    let max_bytes = state.config.max_upload_bytes();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| DriveError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| StorageError::InvalidName("missing file name".into()))?;

        let user_root = state.user_root(&username);
        let relative = query.path.clone();
        let target =
            blocking(move || storage::prepare_upload(&user_root, &relative, &filename)).await?;

        let staging_dir = state.config.staging_dir_path();
        transfer::receive_upload(&mut field, &target, &staging_dir, max_bytes).await?;
        return Ok(ApiResponse::ok("Upload successful"));
    }

    Err(StorageError::MissingField("file".into()).into())
}

/// `POST /delete`
pub async fn delete(
    State(state): State<SharedState>,
    Identity(username): Identity,
    form: Result<Form<PathForm>, FormRejection>,
) -> Result<Json<ApiResponse>, DriveError> {
    let form = form_body(form)?;
    if form.path.is_empty() {
        return Err(StorageError::MissingField("path".into()).into());
    }

    let user_root = state.user_root(&username);
    blocking(move || storage::delete_entry(&user_root, &form.path)).await?;

    Ok(ApiResponse::ok("Deletion successful"))
}

/// `POST /mkdir`
pub async fn mkdir(
    State(state): State<SharedState>,
    Identity(username): Identity,
    form: Result<Form<MkdirForm>, FormRejection>,
) -> Result<Json<ApiResponse>, DriveError> {
    let form = form_body(form)?;

    let user_root = state.user_root(&username);
    blocking(move || storage::make_directory(&user_root, &form.path, &form.name)).await?;

    Ok(ApiResponse::ok("Directory created successfully"))
}

/// `POST /rename`
pub async fn rename(
    State(state): State<SharedState>,
    Identity(username): Identity,
    form: Result<Form<RenameForm>, FormRejection>,
) -> Result<Json<ApiResponse>, DriveError> {
    let form = form_body(form)?;
    if form.path.is_empty() {
        return Err(StorageError::MissingField("path".into()).into());
    }

    let user_root = state.user_root(&username);
    blocking(move || storage::rename_entry(&user_root, &form.path, &form.newname)).await?;

    Ok(ApiResponse::ok("Renaming successful"))
}

/// `POST /move`
pub async fn move_entry(
    State(state): State<SharedState>,
    Identity(username): Identity,
    form: Result<Form<MoveForm>, FormRejection>,
) -> Result<Json<ApiResponse>, DriveError> {
    let form = form_body(form)?;
    if form.path.is_empty() || form.newpath.is_empty() {
        return Err(StorageError::MissingField("path and newpath".into()).into());
    }

    let user_root = state.user_root(&username);
    blocking(move || storage::move_entry(&user_root, &form.path, &form.newpath)).await?;

    Ok(ApiResponse::ok("Move successful"))
}
