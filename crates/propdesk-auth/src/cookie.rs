//! Session cookie carrier
//!
//! The signed session token travels in an HTTP-only cookie named `token`.
//! Building and parsing live here so every call site agrees on the name,
//! the path scope, and the Max-Age.

use axum::http::{HeaderMap, header::COOKIE};

use crate::jwt::SESSION_TTL_SECS;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "token";

/// Build the Set-Cookie value carrying a freshly issued session token.
///
/// `secure` should be set in production-like deployments where the app is
/// served over HTTPS.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the session cookie.
///
/// Logout only clears the client side; a previously captured token stays
/// valid until its natural expiry.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Extract the session token from a request's Cookie header, if present
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let cookie_str = headers.get(COOKIE)?.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == SESSION_COOKIE && !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_format() {
        let cookie = session_cookie("abc.def.ghi", false);
        assert_eq!(
            cookie,
            format!("token=abc.def.ghi; Path=/; HttpOnly; SameSite=Lax; Max-Age={}", SESSION_TTL_SECS)
        );
        assert!(session_cookie("t", true).ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("token=abc"));
        assert_eq!(token_from_headers(&headers), Some("abc"));

        // Other cookies around it
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token=abc; locale=en"),
        );
        assert_eq!(token_from_headers(&headers), Some("abc"));

        // A cleared cookie does not count as a token
        headers.insert(COOKIE, HeaderValue::from_static("token="));
        assert_eq!(token_from_headers(&headers), None);
    }
}
