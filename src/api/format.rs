//! Response bodies. Field names are part of the client contract:
//! `author` and `article` carry the referenced row's id.

use serde::Serialize;

use crate::database::models::{Article, Comment};
use crate::types::{ArticleId, CommentId, UserId};

/// A single article: item GET, create, update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleBody {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub author: UserId,
}

/// One entry of the article collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleListEntry {
    pub title: String,
    pub content: String,
    pub author: UserId,
}

/// A single comment: item GET, create, update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentBody {
    pub id: CommentId,
    pub article: ArticleId,
    pub content: String,
    pub author: UserId,
}

/// One entry of an article's comment collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentListEntry {
    pub article: ArticleId,
    pub content: String,
    pub author: UserId,
}

impl From<Article> for ArticleBody {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            content: article.content,
            author: article.author_id,
        }
    }
}

impl From<Article> for ArticleListEntry {
    fn from(article: Article) -> Self {
        Self {
            title: article.title,
            content: article.content,
            author: article.author_id,
        }
    }
}

impl From<Comment> for CommentBody {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            article: comment.article_id,
            content: comment.content,
            author: comment.author_id,
        }
    }
}

impl From<Comment> for CommentListEntry {
    fn from(comment: Comment) -> Self {
        Self {
            article: comment.article_id,
            content: comment.content,
            author: comment.author_id,
        }
    }
}
