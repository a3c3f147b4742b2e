//! Anti-forgery tokens (double-submit cookie).
//!
//! `GET /api/token` drops a random token into the `csrftoken` cookie. Every
//! unsafe request must echo the same value in the `X-CSRFToken` header. A
//! cross-site page can make the browser send the cookie but cannot read it,
//! so it cannot produce the header.

use axum::http::{HeaderMap, Method};
use uuid::Uuid;

use super::cookies::{self, CookieOptions};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "x-csrftoken";

/// Length of an issued token in hex characters
pub const TOKEN_LEN: usize = 64;

const COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 365;

/// Why an unsafe request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    MissingCookie,
    BadToken,
}

impl CsrfRejection {
    pub fn message(&self) -> &'static str {
        match self {
            CsrfRejection::MissingCookie => "CSRF cookie not set.",
            CsrfRejection::BadToken => "CSRF token missing or incorrect.",
        }
    }
}

/// Generate a fresh token
pub fn issue_anti_forgery_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// The client's current token if it is one we could have issued, otherwise a new one
pub fn reuse_or_issue(headers: &HeaderMap) -> String {
    cookies::parse_cookie(headers, CSRF_COOKIE)
        .filter(|token| is_well_formed(token))
        .unwrap_or_else(issue_anti_forgery_token)
}

/// Methods that change state and therefore need a token
pub fn requires_check(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// Compare the header token against the cookie token
pub fn check(headers: &HeaderMap) -> Result<(), CsrfRejection> {
    let expected = cookies::parse_cookie(headers, CSRF_COOKIE)
        .filter(|token| is_well_formed(token))
        .ok_or(CsrfRejection::MissingCookie)?;

    let provided = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(CsrfRejection::BadToken)?;

    if tokens_match(expected.as_bytes(), provided.trim().as_bytes()) {
        Ok(())
    } else {
        Err(CsrfRejection::BadToken)
    }
}

/// Constant-time equality for equal-length inputs
fn tokens_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// `Set-Cookie` value for the token. Not `HttpOnly`: scripts read it to fill the header.
pub fn csrf_cookie(token: &str, secure: bool) -> String {
    cookies::set_cookie(
        CSRF_COOKIE,
        token,
        CookieOptions { http_only: false, secure, max_age_secs: COOKIE_MAX_AGE_SECS },
    )
}
