use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::api::format::{CommentBody, CommentListEntry};
use crate::api::{JsonBody, ResourceId};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::protected::comment::CommentRequest;
use crate::handlers::protected::utils::{describe_refusal, ARTICLE_MISSING};
use crate::state::AppState;

/// GET /api/article/:id/comment - Comments under the article as `{article, content, author}`
pub async fn get(
    State(state): State<AppState>,
    ResourceId(article_id): ResourceId,
) -> Result<Json<Vec<CommentListEntry>>, ApiError> {
    let comments = state
        .store
        .list_comments_by_article(article_id)
        .await
        .map_err(|e| describe_refusal(e, ARTICLE_MISSING, ARTICLE_MISSING))?;
    Ok(Json(comments.into_iter().map(CommentListEntry::from).collect()))
}

/// POST /api/article/:id/comment - Comment on the article as the caller
///
/// Input: `{"content": "..."}`. 201 with the created comment.
pub async fn post(
    State(state): State<AppState>,
    ResourceId(article_id): ResourceId,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CommentRequest>,
) -> Result<(StatusCode, Json<CommentBody>), ApiError> {
    let comment = state
        .store
        .create_comment(article_id, &body.content, user.id)
        .await
        .map_err(|e| describe_refusal(e, ARTICLE_MISSING, ARTICLE_MISSING))?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}
