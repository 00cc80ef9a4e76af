//! Identity resolution
//!
//! Derives the acting user from request cookies and issues or clears the
//! identity cookie on login and logout.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::validate_username;
use crate::config::IdentityMode;
use crate::error::{AuthError, DriveError};
use crate::server::state::{AppState, SharedState};

/// Cookie naming the user in `cookie` identity mode
pub const USERNAME_COOKIE: &str = "username";

/// Cookie carrying the opaque token in `session` identity mode
pub const SESSION_COOKIE: &str = "session";

/// Reads the identity cookie and returns the acting username.
///
/// In `cookie` mode the value is trusted as long as it is a well-formed
/// username; nothing checks that it was issued by a login.
pub async fn resolve_identity(state: &AppState, jar: &CookieJar) -> Result<String, AuthError> {
    match state.config.identity_mode {
        IdentityMode::Cookie => {
            let username = cookie_value(jar, USERNAME_COOKIE).ok_or(AuthError::NotAuthenticated)?;
            validate_username(&username, state.config.max_username_length)
                .map_err(|_| AuthError::NotAuthenticated)?;
            Ok(username)
        }
        IdentityMode::Session => {
            let token = cookie_value(jar, SESSION_COOKIE).ok_or(AuthError::NotAuthenticated)?;
            state
                .sessions
                .lock()
                .await
                .resolve(&token)
                .ok_or(AuthError::NotAuthenticated)
        }
    }
}

/// Attach the identity cookie for a freshly authenticated user
pub async fn issue_identity(state: &AppState, jar: CookieJar, username: &str) -> CookieJar {
    match state.config.identity_mode {
        IdentityMode::Cookie => {
            let cookie = Cookie::build((USERNAME_COOKIE, username.to_string()))
                .path("/")
                .build();
            jar.add(cookie)
        }
        IdentityMode::Session => {
            let token = state.sessions.lock().await.issue(username);
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build();
            jar.add(cookie)
        }
    }
}

/// Revoke any server-side session and clear both identity cookies
pub async fn clear_identity(state: &AppState, jar: CookieJar) -> CookieJar {
    if let Some(token) = cookie_value(&jar, SESSION_COOKIE) {
        state.sessions.lock().await.revoke(&token);
    }

    jar.remove(Cookie::build(USERNAME_COOKIE).path("/"))
        .remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Extractor for routes that require a resolved identity
#[derive(Debug, Clone)]
pub struct Identity(pub String);

impl FromRequestParts<SharedState> for Identity {
    type Rejection = DriveError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let username = resolve_identity(state, &jar).await?;
        Ok(Identity(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::config::ServerConfig;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn state(mode: IdentityMode) -> AppState {
        let config = ServerConfig {
            identity_mode: mode,
            ..ServerConfig::default()
        };
        AppState::new(config, CredentialStore::open_in_memory().unwrap())
    }

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[tokio::test]
    async fn test_cookie_mode_trusts_username_cookie() {
        let state = state(IdentityMode::Cookie);
        let username = resolve_identity(&state, &jar_with("username=alice")).await.unwrap();
        assert_eq!(username, "alice");
    }

    #[tokio::test]
    async fn test_missing_or_empty_cookie_is_not_authenticated() {
        let state = state(IdentityMode::Cookie);
        assert!(matches!(
            resolve_identity(&state, &CookieJar::new()).await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            resolve_identity(&state, &jar_with("username=")).await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            resolve_identity(&state, &jar_with("username=..")).await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_session_mode_rejects_forged_username_cookie() {
        let state = state(IdentityMode::Session);
        assert!(matches!(
            resolve_identity(&state, &jar_with("username=alice")).await,
            Err(AuthError::NotAuthenticated)
        ));

        let jar = issue_identity(&state, CookieJar::new(), "alice").await;
        let token = jar.get(SESSION_COOKIE).unwrap().value().to_string();
        let username = resolve_identity(&state, &jar_with(&format!("session={}", token)))
            .await
            .unwrap();
        assert_eq!(username, "alice");
    }

    #[tokio::test]
    async fn test_clear_identity_revokes_session() {
        let state = state(IdentityMode::Session);
        let jar = issue_identity(&state, CookieJar::new(), "bob").await;
        let token = jar.get(SESSION_COOKIE).unwrap().value().to_string();

        let request_jar = jar_with(&format!("session={}", token));
        let _jar = clear_identity(&state, request_jar).await;

        assert!(state.sessions.lock().await.is_empty());
        assert!(matches!(
            resolve_identity(&state, &jar_with(&format!("session={}", token))).await,
            Err(AuthError::NotAuthenticated)
        ));
    }
}
