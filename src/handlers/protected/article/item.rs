use axum::{extract::State, http::StatusCode, Extension, Json};

use super::ArticleRequest;
use crate::api::format::ArticleBody;
use crate::api::{JsonBody, ResourceId};
use crate::auth::AuthUser;
use crate::database::models::article::validate_title;
use crate::error::ApiError;
use crate::handlers::protected::utils::{describe_refusal, ARTICLE_MISSING};
use crate::state::AppState;

/// GET /api/article/:id
pub async fn get(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ArticleBody>, ApiError> {
    let article = state
        .store
        .get_article(id)
        .await
        .map_err(|e| describe_refusal(e, ARTICLE_MISSING, ARTICLE_MISSING))?;
    Ok(Json(article.into()))
}

/// PUT /api/article/:id - Replace title and content; author only
pub async fn put(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<ArticleRequest>,
) -> Result<Json<ArticleBody>, ApiError> {
    validate_title(&body.title).map_err(ApiError::bad_request)?;

    let article = state
        .store
        .update_article(id, user.id, &body.title, &body.content)
        .await
        .map_err(|e| {
            describe_refusal(
                e,
                format!("Cannot PUT because article with id {} does not exist", id),
                format!("Cannot PUT because you do not have access to article with id {}", id),
            )
        })?;
    Ok(Json(article.into()))
}

/// DELETE /api/article/:id - Remove the article and all its comments; author only
pub async fn delete(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_article(id, user.id)
        .await
        .map_err(|e| {
            describe_refusal(
                e,
                ARTICLE_MISSING,
                format!("Cannot DELETE because you do not have access to article with id {}", id),
            )
        })?;
    Ok(StatusCode::OK)
}
