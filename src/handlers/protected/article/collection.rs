use axum::{extract::State, http::StatusCode, Extension, Json};

use super::ArticleRequest;
use crate::api::format::{ArticleBody, ArticleListEntry};
use crate::api::JsonBody;
use crate::auth::AuthUser;
use crate::database::models::article::validate_title;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/article - Every article as `{title, content, author}`, oldest first
pub async fn get(State(state): State<AppState>) -> Result<Json<Vec<ArticleListEntry>>, ApiError> {
    let articles = state.store.list_articles().await?;
    Ok(Json(articles.into_iter().map(ArticleListEntry::from).collect()))
}

/// POST /api/article - Create an article authored by the caller
///
/// Input: `{"title": "...", "content": "..."}`. 201 with the created article.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<ArticleRequest>,
) -> Result<(StatusCode, Json<ArticleBody>), ApiError> {
    validate_title(&body.title).map_err(ApiError::bad_request)?;

    let article = state.store.create_article(&body.title, &body.content, user.id).await?;
    Ok((StatusCode::CREATED, Json(article.into())))
}
