// handlers/public/auth/signup.rs - POST /api/signup handler

use axum::{extract::State, http::StatusCode};

use super::CredentialsRequest;
use crate::api::JsonBody;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/signup - Create a user account
///
/// Input: `{"username": "...", "password": "..."}`
///
/// 201 with an empty body; 400 on a malformed body or unusable username;
/// 409 when the username is taken.
pub async fn post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<StatusCode, ApiError> {
    state.credentials.create_user(&body.username, &body.password).await?;
    Ok(StatusCode::CREATED)
}
