/// Shared types used across the codebase

/// Primary key of a row in `users`
pub type UserId = i64;

/// Primary key of a row in `articles`
pub type ArticleId = i64;

/// Primary key of a row in `comments`
pub type CommentId = i64;

/// Resource kinds that carry an author and can be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Article,
    Comment,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Article => "article",
            ResourceKind::Comment => "comment",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            ResourceKind::Article => "articles",
            ResourceKind::Comment => "comments",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
