use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::password::HashingCost;
use crate::auth::{CredentialStore, SessionManager};
use crate::config::AppConfig;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::repository::ResourceStore;

/// Shared state injected into all handlers. Every field is cheap to clone
/// and safe to use from concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: SqlitePool,
    pub store: ResourceStore,
    pub credentials: CredentialStore,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(config: AppConfig, pool: SqlitePool) -> Self {
        let credentials = CredentialStore::new(pool.clone(), HashingCost::from(&config.security));
        let sessions = SessionManager::new(
            pool.clone(),
            credentials.clone(),
            config.security.session_ttl_hours,
            config.security.secure_cookies,
        );

        Self {
            store: ResourceStore::new(pool.clone()),
            credentials,
            sessions,
            pool,
            config: Arc::new(config),
        }
    }

    /// Open (and migrate) the configured database, then build the state
    pub async fn connect(config: AppConfig) -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::open(&config.database).await?;
        Ok(Self::new(config, pool))
    }
}
