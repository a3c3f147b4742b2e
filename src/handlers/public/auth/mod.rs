// handlers/public/auth/mod.rs - Account and token endpoints that need no session

use serde::Deserialize;

pub mod signin; // POST /api/signin - verify credentials, start session
pub mod signup; // POST /api/signup - create account
pub mod token; // GET /api/token - anti-forgery cookie

/// Body of signup and signin
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}
