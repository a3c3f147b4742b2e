use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ArticleId, UserId};

/// Maximum title length in characters
pub const TITLE_MAX_CHARS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

/// Validate an article title: non-empty and at most [`TITLE_MAX_CHARS`] characters
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(format!("Title must be at most {} characters", TITLE_MAX_CHARS));
    }
    Ok(())
}
