//! Cookie header plumbing shared by sessions and the anti-forgery token

use axum::http::{header, HeaderMap};

/// Attributes for a `Set-Cookie` value
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub max_age_secs: i64,
}

/// Read cookie `name` from every `Cookie` header on the request
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Render a `Set-Cookie` value scoped to the whole site
pub fn set_cookie(name: &str, value: &str, options: CookieOptions) -> String {
    let mut cookie = format!("{}={}; Path=/; SameSite=Lax; Max-Age={}", name, value, options.max_age_secs);
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Render a `Set-Cookie` value that removes the cookie from the client
pub fn clear_cookie(name: &str, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=\"\"; Path=/; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        name
    );
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}
