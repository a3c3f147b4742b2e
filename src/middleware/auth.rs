use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the session cookie once per request and, when it names a live
/// session, injects the caller as an `AuthUser` extension. Anonymous requests
/// pass through untouched; gates further in decide what to do with them.
pub async fn load_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match state.sessions.current_user(request.headers()).await {
        Ok(Some(user)) => {
            tracing::debug!("Request from user '{}' (ID: {})", user.username, user.id);
            request.extensions_mut().insert(user);
        }
        Ok(None) => {}
        Err(e) => return ApiError::from(e).into_response(),
    }

    next.run(request).await
}

/// Login gate for the resource routes: anonymous callers are redirected (302)
/// to the configured login page with the requested path as `next`.
pub async fn login_required(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.extensions().get::<AuthUser>().is_some() {
        return next.run(request).await;
    }

    let path = request.uri().path();
    let location = login_redirect(&state.config.security.login_url, path);

    tracing::debug!("Anonymous {} {} redirected to login", request.method(), path);
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// `{login_url}?next={path}` with the path query-encoded. `/` stays literal.
pub fn login_redirect(login_url: &str, path: &str) -> String {
    let next: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
    format!("{}?next={}", login_url, next.replace("%2F", "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_keeps_slashes() {
        assert_eq!(
            login_redirect("/accounts/login/", "/api/article"),
            "/accounts/login/?next=/api/article"
        );
        assert_eq!(
            login_redirect("/accounts/login/", "/api/article/7/comment"),
            "/accounts/login/?next=/api/article/7/comment"
        );
    }

    #[test]
    fn test_login_redirect_escapes_query_characters() {
        assert_eq!(
            login_redirect("/login", "/api/a b&c"),
            "/login?next=/api/a+b%26c"
        );
    }
}
