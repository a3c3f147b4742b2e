use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::auth::policy;
use crate::database::manager::DatabaseError;
use crate::database::models::{Article, Comment};
use crate::types::{ArticleId, CommentId, ResourceKind, UserId};

const ARTICLE_COLUMNS: &str = "id, title, content, author_id";
const COMMENT_COLUMNS: &str = "id, article_id, content, author_id";

/// Articles and their comments.
///
/// Every write that needs an owner carries the owner check in the same
/// statement (`WHERE ... AND author_id = ?`), so a concurrent mutation of the
/// same row can never slip between the check and the write. When a guarded
/// write matches nothing, the row is looked up again inside the same
/// transaction to tell "missing" apart from "not yours".
#[derive(Clone)]
pub struct ResourceStore {
    pool: SqlitePool,
}

impl ResourceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_article(
        &self,
        title: &str,
        content: &str,
        author_id: UserId,
    ) -> Result<Article, DatabaseError> {
        let sql = format!(
            "INSERT INTO articles (title, content, author_id) VALUES (?1, ?2, ?3) RETURNING {}",
            ARTICLE_COLUMNS
        );
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(title)
            .bind(content)
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        info!("Created article {} by user {}", article.id, author_id);
        Ok(article)
    }

    pub async fn get_article(&self, id: ArticleId) -> Result<Article, DatabaseError> {
        let sql = format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS);
        sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(ResourceKind::Article, id))
    }

    /// All articles in insertion order
    pub async fn list_articles(&self) -> Result<Vec<Article>, DatabaseError> {
        let sql = format!("SELECT {} FROM articles ORDER BY id", ARTICLE_COLUMNS);
        Ok(sqlx::query_as::<_, Article>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn update_article(
        &self,
        id: ArticleId,
        editor: UserId,
        title: &str,
        content: &str,
    ) -> Result<Article, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE articles SET title = ?1, content = ?2 WHERE id = ?3 AND author_id = ?4 RETURNING {}",
            ARTICLE_COLUMNS
        );
        let updated = sqlx::query_as::<_, Article>(&sql)
            .bind(title)
            .bind(content)
            .bind(id)
            .bind(editor)
            .fetch_optional(&mut *tx)
            .await?;

        match updated {
            Some(article) => {
                tx.commit().await?;
                info!("Updated article {} by user {}", id, editor);
                Ok(article)
            }
            None => Err(explain_refusal(&mut tx, ResourceKind::Article, id, editor).await),
        }
    }

    /// Delete an article together with every comment under it, atomically.
    /// Returns the number of comments removed.
    pub async fn delete_article(&self, id: ArticleId, editor: UserId) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let comments = sqlx::query(
            "DELETE FROM comments WHERE article_id = ?1 \
             AND EXISTS (SELECT 1 FROM articles WHERE id = ?1 AND author_id = ?2)",
        )
        .bind(id)
        .bind(editor)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let articles = sqlx::query("DELETE FROM articles WHERE id = ?1 AND author_id = ?2")
            .bind(id)
            .bind(editor)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if articles == 0 {
            return Err(explain_refusal(&mut tx, ResourceKind::Article, id, editor).await);
        }

        tx.commit().await?;
        info!("Deleted article {} and {} comment(s) by user {}", id, comments, editor);
        Ok(comments)
    }

    /// Fails with `NotFound` unless `article_id` names an existing article
    pub async fn create_comment(
        &self,
        article_id: ArticleId,
        content: &str,
        author_id: UserId,
    ) -> Result<Comment, DatabaseError> {
        let sql = format!(
            "INSERT INTO comments (article_id, content, author_id) \
             SELECT ?1, ?2, ?3 WHERE EXISTS (SELECT 1 FROM articles WHERE id = ?1) \
             RETURNING {}",
            COMMENT_COLUMNS
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(article_id)
            .bind(content)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(ResourceKind::Article, article_id))?;

        info!("Created comment {} on article {} by user {}", comment.id, article_id, author_id);
        Ok(comment)
    }

    pub async fn get_comment(&self, id: CommentId) -> Result<Comment, DatabaseError> {
        let sql = format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS);
        sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(ResourceKind::Comment, id))
    }

    /// Comments under an article in insertion order. `NotFound` if the
    /// article itself is missing, even when no comment references it.
    pub async fn list_comments_by_article(
        &self,
        article_id: ArticleId,
    ) -> Result<Vec<Comment>, DatabaseError> {
        // One transaction so an in-flight cascade is seen entirely or not at all
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM articles WHERE id = ?1")
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(not_found(ResourceKind::Article, article_id));
        }

        let sql = format!(
            "SELECT {} FROM comments WHERE article_id = ?1 ORDER BY id",
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(article_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(comments)
    }

    pub async fn update_comment(
        &self,
        id: CommentId,
        editor: UserId,
        content: &str,
    ) -> Result<Comment, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE comments SET content = ?1 WHERE id = ?2 AND author_id = ?3 RETURNING {}",
            COMMENT_COLUMNS
        );
        let updated = sqlx::query_as::<_, Comment>(&sql)
            .bind(content)
            .bind(id)
            .bind(editor)
            .fetch_optional(&mut *tx)
            .await?;

        match updated {
            Some(comment) => {
                tx.commit().await?;
                info!("Updated comment {} by user {}", id, editor);
                Ok(comment)
            }
            None => Err(explain_refusal(&mut tx, ResourceKind::Comment, id, editor).await),
        }
    }

    pub async fn delete_comment(&self, id: CommentId, editor: UserId) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM comments WHERE id = ?1 AND author_id = ?2")
            .bind(id)
            .bind(editor)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(explain_refusal(&mut tx, ResourceKind::Comment, id, editor).await);
        }

        tx.commit().await?;
        info!("Deleted comment {} by user {}", id, editor);
        Ok(())
    }
}

fn not_found(kind: ResourceKind, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {}", kind, id))
}

/// Why a guarded write on `kind`/`id` matched no row
async fn explain_refusal(
    conn: &mut SqliteConnection,
    kind: ResourceKind,
    id: i64,
    editor: UserId,
) -> DatabaseError {
    let sql = format!("SELECT author_id FROM {} WHERE id = ?1", kind.table());
    let owner: Option<UserId> = match sqlx::query_scalar(&sql).bind(id).fetch_optional(conn).await {
        Ok(owner) => owner,
        Err(e) => return e.into(),
    };

    match owner {
        Some(owner) if !policy::can_write(editor, owner) => {
            debug!("User {} denied write on {} {} owned by {}", editor, kind, id, owner);
            DatabaseError::PermissionDenied(format!("{} {}", kind, id))
        }
        _ => not_found(kind, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::manager::DatabaseManager;

    async fn store_with_users() -> (ResourceStore, UserId, UserId) {
        let pool = DatabaseManager::open(&AppConfig::for_tests().database).await.unwrap();
        for name in ["alice", "bobby"] {
            sqlx::query("INSERT INTO users (username, password_hash, created_at) VALUES (?1, 'x', '2024-01-01T00:00:00Z')")
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }
        (ResourceStore::new(pool), 1, 2)
    }

    #[tokio::test]
    async fn test_article_round_trip() {
        let (store, alice, _) = store_with_users().await;

        let created = store.create_article("Hello!", "Alice says hello!", alice).await.unwrap();
        let fetched = store.get_article(created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.author_id, alice);
        assert_eq!(store.list_articles().await.unwrap(), vec![fetched]);
    }

    #[tokio::test]
    async fn test_update_article_requires_author() {
        let (store, alice, bobby) = store_with_users().await;
        let article = store.create_article("Hello!", "Alice says hello!", alice).await.unwrap();

        let denied = store.update_article(article.id, bobby, "Hijacked", "nope").await;
        assert!(matches!(denied, Err(DatabaseError::PermissionDenied(_))));
        assert_eq!(store.get_article(article.id).await.unwrap(), article);

        let updated = store.update_article(article.id, alice, "Hello!", "Edited").await.unwrap();
        assert_eq!(updated.content, "Edited");
        assert_eq!(updated.author_id, alice);

        let missing = store.update_article(999, alice, "t", "c").await;
        assert!(matches!(missing, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_article_cascades_to_comments() {
        let (store, alice, bobby) = store_with_users().await;
        let doomed = store.create_article("Doomed", "bye", alice).await.unwrap();
        let kept = store.create_article("Kept", "stays", alice).await.unwrap();

        let c1 = store.create_comment(doomed.id, "first", bobby).await.unwrap();
        let c2 = store.create_comment(doomed.id, "second", alice).await.unwrap();
        let other = store.create_comment(kept.id, "elsewhere", bobby).await.unwrap();

        let denied = store.delete_article(doomed.id, bobby).await;
        assert!(matches!(denied, Err(DatabaseError::PermissionDenied(_))));
        assert_eq!(store.list_comments_by_article(doomed.id).await.unwrap().len(), 2);

        assert_eq!(store.delete_article(doomed.id, alice).await.unwrap(), 2);

        assert!(matches!(store.get_article(doomed.id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(store.get_comment(c1.id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(store.get_comment(c2.id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(
            store.list_comments_by_article(doomed.id).await,
            Err(DatabaseError::NotFound(_))
        ));
        assert_eq!(store.get_comment(other.id).await.unwrap(), other);
    }

    #[tokio::test]
    async fn test_comment_requires_existing_article() {
        let (store, alice, _) = store_with_users().await;

        let orphan = store.create_comment(42, "nowhere", alice).await;
        assert!(matches!(orphan, Err(DatabaseError::NotFound(_))));

        let article = store.create_article("Empty", "no comments yet", alice).await.unwrap();
        assert!(store.list_comments_by_article(article.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_writes_require_author() {
        let (store, alice, bobby) = store_with_users().await;
        let article = store.create_article("Hello!", "Alice says hello!", alice).await.unwrap();
        let comment = store.create_comment(article.id, "Hi Alice", bobby).await.unwrap();

        assert!(matches!(
            store.update_comment(comment.id, alice, "rewritten").await,
            Err(DatabaseError::PermissionDenied(_))
        ));
        assert!(matches!(
            store.delete_comment(comment.id, alice).await,
            Err(DatabaseError::PermissionDenied(_))
        ));

        let updated = store.update_comment(comment.id, bobby, "Hi again").await.unwrap();
        assert_eq!(updated.content, "Hi again");
        assert_eq!(updated.article_id, article.id);

        store.delete_comment(comment.id, bobby).await.unwrap();
        assert!(matches!(
            store.delete_comment(comment.id, bobby).await,
            Err(DatabaseError::NotFound(_))
        ));
        assert!(matches!(
            store.update_comment(comment.id, bobby, "ghost").await,
            Err(DatabaseError::NotFound(_))
        ));
    }
}
