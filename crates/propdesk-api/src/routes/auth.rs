//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use propdesk_auth::{
    AuthError, SessionKeys, SessionUser, clear_session_cookie, hash_password,
    redirect_if_authenticated, session_cookie, token_from_headers, verify_auth_system,
    verify_password,
};
use propdesk_db::NewUser;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginRequest, PageInfo, RegisterRequest, UserResponse};

// ==================== Session Extractor ====================

/// Extractor for a verified session (the route guard)
///
/// Rejects with 401 when the cookie is absent, expired, or tampered, and
/// with 500 when the signing secret is not configured.
pub struct RequireSession(pub SessionUser);

impl<S> FromRequestParts<S> for RequireSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = token_from_headers(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = app_state.keys.verify(token)?;
        let user = SessionUser::from_claims(&claims);

        debug!("Authenticated request from {}", user.email);
        Ok(RequireSession(user))
    }
}

// ==================== Input Validation ====================

/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 255;
/// Maximum allowed display name length
const MAX_NAME_LENGTH: usize = 255;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// A well-formed hash that no password verifies against. Verified in place
/// of a real hash when the email has no account, so response timing does not
/// reveal whether the lookup matched.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$cHJvcGRlc2stcGxhY2Vob2xkZXI$bm90dGhlcmlnaHRkaWdlc3QwMDAwMDAwMDAw";

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    validate_credentials(&request.email, &request.password)?;

    let email = request.email.to_lowercase();
    debug!("Login attempt for {}", email);

    let user_result = state.db.get_user_by_email(&email).await?;

    let (hash_to_verify, user) = match user_result {
        Some(u) => (u.password_hash.clone(), Some(u)),
        None => (DUMMY_HASH.to_string(), None),
    };

    let password_valid = verify_password(&request.password, &hash_to_verify);

    // One generic rejection for unknown email, corrupt hash, and wrong
    // password alike; the response must not reveal which it was.
    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => return Err(ApiError::Auth(AuthError::InvalidCredentials)),
    };

    let token = state.keys.issue(user.id, &user.email, Some(&user.name))?;

    info!("User {} logged in", user.email);

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, state.cookie_secure))],
        Json(UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        }),
    )
        .into_response())
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".to_string(),
        ));
    }
    if request.name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    validate_credentials(&request.email, &request.password)?;
    if !request.email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }

    let email = request.email.to_lowercase();
    debug!("Registration attempt for {}", email);

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;

    // A registration racing past the pre-check is caught by the unique
    // constraint and surfaces as the same conflict response.
    let user = state
        .db
        .insert_user(NewUser {
            name: request.name,
            email,
            password_hash,
        })
        .await?;

    info!("Registered user {} ({})", user.email, user.id);

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
        }),
    )
        .into_response())
}

/// POST /api/auth/logout
///
/// Clears the cookie only; the signed token itself stays valid until its
/// natural expiry.
async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// GET /api/auth/check
async fn check(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = token_from_headers(&headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "authenticated": false }))).into_response();
    };

    match state.keys.verify(token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(json!({
                "authenticated": true,
                "user": SessionUser::from_claims(&claims),
            })),
        )
            .into_response(),
        // A missing secret is an operator problem and must not look like a
        // stale session.
        Err(e @ AuthError::SecretNotConfigured) => e.into_response(),
        Err(_) => (StatusCode::UNAUTHORIZED, Json(json!({ "authenticated": false }))).into_response(),
    }
}

/// GET /api/auth/diagnose
async fn diagnose(State(state): State<AppState>) -> Response {
    let report = verify_auth_system(&state.db, state.keys.is_configured()).await;
    Json(report).into_response()
}

// ==================== Public-only Pages ====================

async fn login_info() -> Json<PageInfo> {
    Json(PageInfo {
        page: "login",
        message: "Sign in with your email and password",
    })
}

async fn register_info() -> Json<PageInfo> {
    Json(PageInfo {
        page: "register",
        message: "Create an account with name, email and password",
    })
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/check", get(check))
        .route("/api/auth/diagnose", get(diagnose))
}

/// Create the public-only page routes
///
/// Already-authenticated callers are redirected away instead of being shown
/// a credentials form again.
pub fn public_page_routes(keys: Arc<SessionKeys>) -> Router<AppState> {
    Router::new()
        .route("/login", get(login_info))
        .route("/register", get(register_info))
        .layer(middleware::from_fn_with_state(keys, redirect_if_authenticated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header::SET_COOKIE};
    use propdesk_db::Database;
    use tower::ServiceExt;

    async fn test_app(secret: Option<&str>) -> axum::Router {
        let db = Database::new_in_memory().await.unwrap();
        let keys = Arc::new(SessionKeys::new(secret));
        let state = AppState::new(db, keys, false);
        crate::routes::create_router(state, None)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register_ann(app: &axum::Router) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({ "name": "Ann", "email": "ann@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    fn session_cookie_from(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("login should set a cookie")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("token="));
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_then_login_flow() {
        let app = test_app(Some("test-secret")).await;

        let created = register_ann(&app).await;
        assert!(created["id"].as_i64().unwrap() > 0);
        assert_eq!(created["name"], "Ann");
        assert_eq!(created["email"], "ann@x.com");
        assert!(created.get("password").is_none());
        assert!(created.get("password_hash").is_none());

        // Email lookup is case-insensitive
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": "ANN@X.COM", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie_from(&response);
        let body = body_json(response).await;
        assert_eq!(body["email"], "ann@x.com");

        // The cookie authenticates /api/auth/check
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/check")
                    .header("cookie", &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["email"], "ann@x.com");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app = test_app(Some("test-secret")).await;
        register_ann(&app).await;

        // Wrong password for an existing account
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": "ann@x.com", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let wrong_password = body_json(response).await;

        // Account that does not exist
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": "nobody@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let no_account = body_json(response).await;

        assert_eq!(wrong_password, no_account);
        assert_eq!(wrong_password["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_before_db() {
        let app = test_app(Some("test-secret")).await;

        for body in [
            json!({ "email": "", "password": "secret1" }),
            json!({ "email": "ann@x.com", "password": "" }),
            json!({}),
        ] {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/api/auth/login", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({ "name": "Ann", "email": "ann@x.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_registration_collides_across_casing() {
        let app = test_app(Some("test-secret")).await;
        register_ann(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({ "name": "Ann", "email": "Ann@X.com", "password": "other" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"], "User with this email already exists");
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_and_check_rejects() {
        let app = test_app(Some("test-secret")).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("token=;"));
        assert!(set_cookie.contains("Max-Age=0"));
        let body = body_json(response).await;
        assert_eq!(body["success"], true);

        // Without a cookie the session check fails closed
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/auth/check").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], false);
    }

    #[tokio::test]
    async fn test_missing_secret_is_a_server_error_not_bad_credentials() {
        let app = test_app(None).await;
        register_ann(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": "ann@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/check")
                    .header("cookie", "token=some-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_diagnose_reports_missing_secret() {
        let app = test_app(None).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/auth/diagnose").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["critical"], true);
        assert!(
            body["issues"]
                .as_array()
                .unwrap()
                .iter()
                .any(|i| i["component"] == "jwt")
        );
    }

    #[tokio::test]
    async fn test_public_pages_redirect_authenticated_callers() {
        let app = test_app(Some("test-secret")).await;
        register_ann(&app).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": "ann@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        let cookie = session_cookie_from(&response);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/login")
                    .header("cookie", &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/dashboard");
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_session() {
        let app = test_app(Some("test-secret")).await;

        for uri in ["/api/clients", "/api/tasks", "/dashboard"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/clients")
                    .header("cookie", "token=tampered.token.value")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
