use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::cookies::{self, CookieOptions};
use super::credentials::CredentialStore;
use super::AuthError;
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::types::UserId;

pub const SESSION_COOKIE: &str = "sessionid";

/// Upper bound on the configured lifetime (ten years)
const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

/// Opaque credential handed to the client in the session cookie.
/// Only its SHA-256 digest is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    fn generate() -> Self {
        Self(format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn digest(&self) -> String {
        digest_token(&self.0)
    }
}

/// Identity of the caller, resolved once per request from the session cookie
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
}

/// Issues, resolves and ends sessions
#[derive(Clone)]
pub struct SessionManager {
    pool: SqlitePool,
    credentials: CredentialStore,
    ttl: Duration,
    secure_cookies: bool,
}

impl SessionManager {
    pub fn new(pool: SqlitePool, credentials: CredentialStore, ttl_hours: u64, secure_cookies: bool) -> Self {
        Self {
            pool,
            credentials,
            ttl: Duration::hours(ttl_hours.min(MAX_TTL_HOURS) as i64),
            secure_cookies,
        }
    }

    /// Verify credentials against the credential store
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.credentials.verify(username, password).await
    }

    /// Start a session for `user_id`
    pub async fn create_session(&self, user_id: UserId) -> Result<SessionToken, AuthError> {
        self.purge_expired().await?;

        let token = SessionToken::generate();
        let expires_at = (Utc::now() + self.ttl).timestamp();

        sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)")
            .bind(token.digest())
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        info!("Started session for user {}", user_id);
        Ok(token)
    }

    /// Resolve the caller from the request's session cookie. `None` when
    /// there is no cookie or it names an unknown or expired session.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Option<AuthUser>, AuthError> {
        let Some(token) = Self::token_from(headers) else {
            return Ok(None);
        };

        let row: Option<(UserId, String)> = sqlx::query_as(
            "SELECT u.id, u.username FROM sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.token_hash = ?1 AND s.expires_at > ?2",
        )
        .bind(digest_token(&token))
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if row.is_none() {
            debug!("Session cookie did not resolve to a live session");
        }
        Ok(row.map(|(id, username)| AuthUser { id, username }))
    }

    /// End the session carried by the request. `Unauthenticated` if there is none.
    pub async fn destroy_session(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = Self::token_from(headers).ok_or(AuthError::Unauthenticated)?;
        if self.destroy_token(&token).await? {
            Ok(())
        } else {
            Err(AuthError::Unauthenticated)
        }
    }

    /// Remove a session by its raw token; true if one existed
    pub async fn destroy_token(&self, token: &str) -> Result<bool, AuthError> {
        let removed = sqlx::query("DELETE FROM sessions WHERE token_hash = ?1")
            .bind(digest_token(token))
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .rows_affected();
        Ok(removed > 0)
    }

    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let purged = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .rows_affected();
        if purged > 0 {
            debug!("Purged {} expired session(s)", purged);
        }
        Ok(purged)
    }

    /// Raw session token from the request cookie, if any
    pub fn token_from(headers: &HeaderMap) -> Option<String> {
        cookies::parse_cookie(headers, SESSION_COOKIE)
    }

    pub fn session_cookie(&self, token: &SessionToken) -> String {
        cookies::set_cookie(SESSION_COOKIE, token.as_str(), self.cookie_options())
    }

    pub fn clear_session_cookie(&self) -> String {
        cookies::clear_cookie(SESSION_COOKIE, self.cookie_options())
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            http_only: true,
            secure: self.secure_cookies,
            max_age_secs: self.ttl.num_seconds(),
        }
    }
}

fn digest_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::HashingCost;
    use crate::config::AppConfig;
    use crate::database::manager::DatabaseManager;
    use axum::http::{header, HeaderValue};

    async fn manager(ttl_hours: u64) -> (SessionManager, User) {
        let config = AppConfig::for_tests();
        let pool = DatabaseManager::open(&config.database).await.unwrap();
        let credentials = CredentialStore::new(pool.clone(), HashingCost::from(&config.security));
        let user = credentials.create_user("alice", "alice1212").await.unwrap();
        (SessionManager::new(pool, credentials, ttl_hours, false), user)
    }

    fn cookie_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (sessions, user) = manager(1).await;
        let authed = sessions.authenticate("alice", "alice1212").await.unwrap();
        assert_eq!(authed.id, user.id);

        let token = sessions.create_session(user.id).await.unwrap();
        let headers = cookie_headers(token.as_str());

        let current = sessions.current_user(&headers).await.unwrap().unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.username, "alice");

        sessions.destroy_session(&headers).await.unwrap();
        assert!(sessions.current_user(&headers).await.unwrap().is_none());
        assert!(matches!(sessions.destroy_session(&headers).await, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_unknown_or_missing_cookie_is_anonymous() {
        let (sessions, _) = manager(1).await;
        assert!(sessions.current_user(&HeaderMap::new()).await.unwrap().is_none());
        assert!(sessions.current_user(&cookie_headers("forged")).await.unwrap().is_none());
        assert!(matches!(
            sessions.destroy_session(&HeaderMap::new()).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_expired_sessions_do_not_resolve() {
        let (sessions, user) = manager(0).await;
        let token = sessions.create_session(user.id).await.unwrap();

        assert!(sessions.current_user(&cookie_headers(token.as_str())).await.unwrap().is_none());
        assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    }

    #[test]
    fn test_only_digest_is_stored() {
        let token = SessionToken::generate();
        assert_eq!(token.as_str().len(), 64);
        assert_eq!(token.digest().len(), 64);
        assert_ne!(token.digest(), token.as_str());
    }
}
