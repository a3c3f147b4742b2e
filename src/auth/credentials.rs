use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::OnceCell;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::password::{self, HashingCost};
use super::AuthError;
use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Longest username accepted at signup
pub const USERNAME_MAX_CHARS: usize = 150;

/// Plaintext behind the hash checked when the username is unknown
const DUMMY_PASSWORD: &str = "blog-api-unknown-user";

/// Persists user identities and checks passwords against them
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
    cost: HashingCost,
    /// Hash at the configured cost, verified against for unknown usernames
    dummy_hash: Arc<OnceCell<String>>,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool, cost: HashingCost) -> Self {
        Self {
            pool,
            cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create a user with a freshly hashed password
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, AuthError> {
        validate_username_format(username).map_err(AuthError::InvalidInput)?;
        if password.is_empty() {
            return Err(AuthError::InvalidInput("Password cannot be empty".to_string()));
        }

        let hash = hash_off_thread(password.to_string(), self.cost).await?;

        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(&hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                info!("Created user '{}' (ID: {})", user.username, user.id);
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DatabaseError::Conflict(format!("Username '{}' is already taken", username)).into())
            }
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(user)
    }

    /// Check a username/password pair. Unknown users and wrong passwords
    /// both yield `InvalidCredentials`, and both pay for one Argon2 verify.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.find_by_username(username).await? else {
            let dummy = self.dummy_hash().await?;
            verify_off_thread(password.to_string(), dummy).await?;
            warn!("Signin failed: unknown user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        };

        if verify_off_thread(password.to_string(), user.password_hash.clone()).await? {
            Ok(user)
        } else {
            warn!("Signin failed: wrong password for '{}'", username);
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn dummy_hash(&self) -> Result<String, AuthError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }
        let hash = hash_off_thread(DUMMY_PASSWORD.to_string(), self.cost).await?;
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }
}

/// Runs Argon2 on the blocking pool
async fn hash_off_thread(password: String, cost: HashingCost) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password, cost))
        .await
        .map_err(|e| AuthError::Password(format!("Password hashing task failed: {e}")))?
}

async fn verify_off_thread(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Password(format!("Password verification task failed: {e}")))?
}

/// Validate username format: 1..=150 characters of letters, digits and `@.+-_`
pub fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(format!("Username must be at most {} characters", USERNAME_MAX_CHARS));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err("Username can only contain letters, numbers and @/./+/-/_".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::manager::DatabaseManager;

    async fn store() -> CredentialStore {
        let config = AppConfig::for_tests();
        let pool = DatabaseManager::open(&config.database).await.unwrap();
        CredentialStore::new(pool, HashingCost::from(&config.security))
    }

    #[test]
    fn test_username_format() {
        assert!(validate_username_format("alice").is_ok());
        assert!(validate_username_format("a.b+c-d_e@f").is_ok());
        assert!(validate_username_format("").is_err());
        assert!(validate_username_format("has space").is_err());
        assert!(validate_username_format(&"x".repeat(151)).is_err());
    }

    #[tokio::test]
    async fn test_create_then_verify() {
        let store = store().await;
        let user = store.create_user("alice", "alice1212").await.unwrap();
        assert_ne!(user.password_hash, "alice1212");

        let verified = store.verify("alice", "alice1212").await.unwrap();
        assert_eq!(verified.id, user.id);

        assert!(matches!(store.verify("alice", "alice12123").await, Err(AuthError::InvalidCredentials)));
        assert!(matches!(store.verify("nobody", "alice1212").await, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_user_still_checks_a_hash() {
        let store = store().await;
        assert!(store.dummy_hash.get().is_none());

        assert!(matches!(store.verify("nobody", "whatever").await, Err(AuthError::InvalidCredentials)));
        let dummy = store.dummy_hash.get().cloned().unwrap();
        assert!(dummy.starts_with("$argon2id"));

        // Reused, not re-hashed, on later misses
        assert!(matches!(store.verify("ghost", DUMMY_PASSWORD).await, Err(AuthError::InvalidCredentials)));
        assert_eq!(store.dummy_hash.get(), Some(&dummy));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = store().await;
        store.create_user("alice", "alice1212").await.unwrap();

        let duplicate = store.create_user("alice", "other").await;
        assert!(matches!(duplicate, Err(AuthError::Database(DatabaseError::Conflict(_)))));
    }

    #[tokio::test]
    async fn test_rejects_empty_password() {
        let store = store().await;
        assert!(matches!(store.create_user("alice", "").await, Err(AuthError::InvalidInput(_))));
    }
}
