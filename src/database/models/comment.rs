use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ArticleId, CommentId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub content: String,
    pub author_id: UserId,
}

