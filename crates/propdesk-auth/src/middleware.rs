//! Session guard middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::cookie::token_from_headers;
use crate::jwt::{SessionClaims, SessionKeys};

/// Identity established from a verified session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

impl SessionUser {
    /// Create from verified session claims
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            id: claims.user_id(),
            email: claims.email.clone(),
            name: claims.name.clone(),
        }
    }
}

/// Where authenticated callers of public-only pages are sent
const DASHBOARD_PATH: &str = "/dashboard";

/// Middleware for public-only pages (login and register)
///
/// A caller who already holds a valid session has no business re-submitting
/// credentials; send them to the dashboard instead. Callers without a valid
/// session pass through untouched, including ones with an expired cookie.
pub async fn redirect_if_authenticated(
    State(keys): State<Arc<SessionKeys>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(token) = token_from_headers(request.headers()) {
        if let Ok(claims) = keys.verify(token) {
            debug!("Authenticated visit to public-only page by {}", claims.email);
            return Redirect::to(DASHBOARD_PATH).into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_user_from_claims() {
        let claims = SessionClaims {
            sub: "42".to_string(),
            email: "ann@x.com".to_string(),
            name: Some("Ann".to_string()),
            iat: 0,
            exp: 0,
        };
        let user = SessionUser::from_claims(&claims);
        assert_eq!(user.id, 42);
        assert_eq!(user.email, "ann@x.com");

        // Non-numeric subject degrades to 0 rather than panicking
        let claims = SessionClaims { sub: "abc".to_string(), ..claims };
        assert_eq!(SessionUser::from_claims(&claims).id, 0);
    }
}
