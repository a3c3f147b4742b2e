// handlers/public/auth/signin.rs - POST /api/signin handler

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
};

use super::CredentialsRequest;
use crate::api::JsonBody;
use crate::auth::{csrf, AuthError, SessionManager};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/signin - Verify credentials and start a session
///
/// Input: `{"username": "...", "password": "..."}`
///
/// Success is 204 with two cookies: a new `sessionid` and a rotated
/// `csrftoken`. Any session the request already carried is ended first, on
/// success and on failure alike. Wrong credentials give 401
/// `{"error": "Wrong Authentication"}`.
pub async fn post(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let sessions = &state.sessions;

    if let Some(previous) = SessionManager::token_from(&headers) {
        sessions.destroy_token(&previous).await?;
    }

    let user = match sessions.authenticate(&body.username, &body.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            let mut response = ApiError::unauthorized("Wrong Authentication").into_response();
            if let Ok(clear) = sessions.clear_session_cookie().parse::<HeaderValue>() {
                response.headers_mut().append(header::SET_COOKIE, clear);
            }
            return Ok(response);
        }
        Err(e) => return Err(e.into()),
    };

    let token = sessions.create_session(user.id).await?;
    let rotated = csrf::issue_anti_forgery_token();

    tracing::info!("User '{}' (ID: {}) signed in", user.username, user.id);

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (header::SET_COOKIE, sessions.session_cookie(&token)),
            (header::SET_COOKIE, csrf::csrf_cookie(&rotated, sessions.secure_cookies())),
        ]),
    )
        .into_response())
}
