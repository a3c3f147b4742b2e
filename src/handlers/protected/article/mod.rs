// handlers/protected/article/mod.rs - Article routes (login gated)
//
// /api/article              GET, POST      → collection.rs
// /api/article/:id          GET, PUT, DELETE → item.rs
// /api/article/:id/comment  GET, POST      → comments.rs

use serde::Deserialize;

pub mod collection;
pub mod comments;
pub mod item;

/// Body of article create and update
#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    pub title: String,
    pub content: String,
}
