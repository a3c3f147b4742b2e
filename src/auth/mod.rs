pub mod cookies;
pub mod credentials;
pub mod csrf;
pub mod password;
pub mod policy;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{AuthUser, SessionManager, SessionToken};

use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Errors from credential checks and the session lifecycle
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Wrong Authentication")]
    InvalidCredentials,

    #[error("No active session")]
    Unauthenticated,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Password error: {0}")]
    Password(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
