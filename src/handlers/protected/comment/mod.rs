// handlers/protected/comment/mod.rs - Comment item routes (login gated)

use serde::Deserialize;

pub mod item;

/// Body of comment create and update. The comment's article is fixed at
/// creation, so an `article` field in an update is ignored.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}
