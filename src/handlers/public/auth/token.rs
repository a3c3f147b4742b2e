// handlers/public/auth/token.rs - GET /api/token handler

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
};

use crate::auth::csrf;
use crate::state::AppState;

/// GET /api/token - Hand out the anti-forgery token
///
/// 204 with a `csrftoken` cookie. A well-formed token the client already
/// holds is kept so that open tabs stay valid.
pub async fn get(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let token = csrf::reuse_or_issue(&headers);

    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(
            header::SET_COOKIE,
            csrf::csrf_cookie(&token, state.config.security.secure_cookies),
        )]),
    )
}
