//! Password hashing and verification using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use super::AuthError;
use crate::config::SecurityConfig;

/// Argon2 cost parameters taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl From<&SecurityConfig> for HashingCost {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
        }
    }
}

impl HashingCost {
    fn hasher(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, 1, None)
            .map_err(|e| AuthError::Password(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a password, returning the PHC string (salt and parameters included)
pub fn hash_password(password: &str, cost: HashingCost) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    cost.hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Password(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored PHC hash. Parameters come from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Password(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
