use axum::{extract::State, http::StatusCode, Extension, Json};

use super::CommentRequest;
use crate::api::format::CommentBody;
use crate::api::{JsonBody, ResourceId};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::protected::utils::{describe_refusal, COMMENT_MISSING};
use crate::state::AppState;

/// GET /api/comment/:id
pub async fn get(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<CommentBody>, ApiError> {
    let comment = state
        .store
        .get_comment(id)
        .await
        .map_err(|e| describe_refusal(e, COMMENT_MISSING, COMMENT_MISSING))?;
    Ok(Json(comment.into()))
}

/// PUT /api/comment/:id - Replace the content; author only
pub async fn put(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CommentRequest>,
) -> Result<Json<CommentBody>, ApiError> {
    let comment = state
        .store
        .update_comment(id, user.id, &body.content)
        .await
        .map_err(|e| {
            describe_refusal(
                e,
                COMMENT_MISSING,
                format!("Cannot PUT because you do not have access to comment with id {}", id),
            )
        })?;
    Ok(Json(comment.into()))
}

/// DELETE /api/comment/:id - author only
pub async fn delete(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_comment(id, user.id)
        .await
        .map_err(|e| {
            describe_refusal(
                e,
                COMMENT_MISSING,
                format!("Cannot DELETE because you do not have access to comment with id {}", id),
            )
        })?;
    Ok(StatusCode::OK)
}
