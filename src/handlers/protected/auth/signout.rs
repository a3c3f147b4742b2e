// handlers/protected/auth/signout.rs - GET /api/signout handler

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Extension,
};

use crate::auth::{AuthError, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

const NOT_SIGNED_IN: &str = "Cannot sign out when not signed in";

/// GET /api/signout - End the current session
///
/// 204 and a cleared `sessionid` cookie. Unlike the resource routes this
/// answers an anonymous caller with 401 `{"error": ...}`, not a redirect.
pub async fn get(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(Extension(user)) = user else {
        return Err(ApiError::unauthorized(NOT_SIGNED_IN));
    };

    match state.sessions.destroy_session(&headers).await {
        Ok(()) => {}
        Err(AuthError::Unauthenticated) => return Err(ApiError::unauthorized(NOT_SIGNED_IN)),
        Err(e) => return Err(e.into()),
    }

    tracing::info!("User '{}' (ID: {}) signed out", user.username, user.id);

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, state.sessions.clear_session_cookie())]),
    )
        .into_response())
}
