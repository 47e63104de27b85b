//! Authentication endpoints: signup, signin, signout.
//!
//! Each handler runs the same straight-line flow: validate the payload,
//! call the credential service, sign a session token and attach it as a
//! cookie. A token is only ever issued after both validation and the
//! credential service succeed.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiError;
use crate::api::validation::{validate_signin, validate_signup};
use crate::auth::{cookies, token};
use crate::db::{AuthResponse, MessageResponse, SigninRequest, SignupRequest, UserResponse};
use crate::AppState;

/// Register a new user
///
/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let new_user = validate_signup(&req)?;

    let user = state.auth.create_user(new_user).await?;

    let token = token::sign(&state.config.auth, &user)?;
    let jar = jar.add(cookies::session_cookie(token, &state.config.auth));

    info!(email = %user.email, "User registered successfully");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "User Registered".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Authenticate an existing user
///
/// POST /api/auth/signin
pub async fn signin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SigninRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let credentials = validate_signin(&req)?;

    let user = state
        .auth
        .authenticate_user(&credentials.email, &credentials.password)
        .await?;

    let token = token::sign(&state.config.auth, &user)?;
    let jar = jar.add(cookies::session_cookie(token, &state.config.auth));

    info!(email = %user.email, "User signed in successfully");

    Ok((
        StatusCode::OK,
        jar,
        Json(AuthResponse {
            message: "Sign In Successful".to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Clear the session cookie
///
/// POST /api/auth/signout
///
/// Idempotent: succeeds whether or not a session cookie was present.
pub async fn signout(jar: CookieJar) -> (StatusCode, CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(cookies::clear_session_cookie());

    info!("User signed out");

    (
        StatusCode::OK,
        jar,
        Json(MessageResponse {
            message: "Sign Out Successful".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthService;
    use crate::config::Config;
    use crate::db;

    async fn test_state() -> Arc<AppState> {
        let pool = db::init_in_memory().await.unwrap();
        let mut config = Config::default();
        config.auth.jwt_secret = "handler-test-secret".to_string();
        Arc::new(AppState {
            auth: AuthService::new(pool.clone()),
            config,
            db: pool,
        })
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            name: Some("Test User".to_string()),
            email: Some(email.to_string()),
            password: Some("hunter2hunter2".to_string()),
            role: None,
        }
    }

    fn session_token(jar: &CookieJar) -> Option<String> {
        jar.get(cookies::SESSION_COOKIE)
            .map(|c| c.value().to_string())
    }

    #[tokio::test]
    async fn test_signup_issues_cookie_with_matching_claims() {
        let state = test_state().await;

        let (status, jar, body) = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("new@example.com")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "User Registered");
        assert_eq!(body.user.email, "new@example.com");
        assert_eq!(body.user.role, "user");

        let token = session_token(&jar).expect("session cookie set");
        let claims = token::verify(&state.config.auth, &token).unwrap();
        assert_eq!(claims.sub, body.user.id);
        assert_eq!(claims.email, body.user.email);
        assert_eq!(claims.role, body.user.role);
    }

    #[tokio::test]
    async fn test_signup_response_has_no_password_field() {
        let state = test_state().await;

        let (_, _, body) = signup(
            State(state),
            CookieJar::new(),
            Json(signup_request("leak@example.com")),
        )
        .await
        .unwrap();

        let json = serde_json::to_value(&body.user).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("password_hash"));
    }

    #[tokio::test]
    async fn test_signup_validation_failure_skips_service() {
        let state = test_state().await;

        let err = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(SignupRequest {
                name: None,
                email: Some("bad".to_string()),
                password: Some("short".to_string()),
                role: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // Nothing was persisted
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_conflict() {
        let state = test_state().await;

        signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("dup@example.com")),
        )
        .await
        .unwrap();

        let err = signup(
            State(state),
            CookieJar::new(),
            Json(signup_request("dup@example.com")),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_signup_with_explicit_role() {
        let state = test_state().await;

        let mut req = signup_request("admin@example.com");
        req.role = Some("admin".to_string());

        let (_, _, body) = signup(State(state), CookieJar::new(), Json(req))
            .await
            .unwrap();
        assert_eq!(body.user.role, "admin");
    }

    #[tokio::test]
    async fn test_signin_success() {
        let state = test_state().await;

        signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("in@example.com")),
        )
        .await
        .unwrap();

        let (status, jar, body) = signin(
            State(state.clone()),
            CookieJar::new(),
            Json(SigninRequest {
                email: Some("in@example.com".to_string()),
                password: Some("hunter2hunter2".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.message, "Sign In Successful");

        let token = session_token(&jar).expect("session cookie set");
        let claims = token::verify(&state.config.auth, &token).unwrap();
        assert_eq!(claims.email, "in@example.com");
    }

    #[tokio::test]
    async fn test_signin_failures_are_identical() {
        let state = test_state().await;

        signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("real@example.com")),
        )
        .await
        .unwrap();

        let unknown_user = signin(
            State(state.clone()),
            CookieJar::new(),
            Json(SigninRequest {
                email: Some("ghost@example.com".to_string()),
                password: Some("hunter2hunter2".to_string()),
            }),
        )
        .await
        .unwrap_err();

        let wrong_password = signin(
            State(state),
            CookieJar::new(),
            Json(SigninRequest {
                email: Some("real@example.com".to_string()),
                password: Some("wrong-password".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

        // Byte-identical bodies: no account enumeration
        let body_a = axum::response::IntoResponse::into_response(unknown_user);
        let body_b = axum::response::IntoResponse::into_response(wrong_password);
        let bytes_a = axum::body::to_bytes(body_a.into_body(), usize::MAX).await.unwrap();
        let bytes_b = axum::body::to_bytes(body_b.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[tokio::test]
    async fn test_signin_validation_failure() {
        let state = test_state().await;

        let err = signin(
            State(state),
            CookieJar::new(),
            Json(SigninRequest::default()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signout_is_idempotent() {
        let (status1, jar1, body1) = signout(CookieJar::new()).await;
        assert_eq!(status1, StatusCode::OK);
        assert_eq!(body1.message, "Sign Out Successful");
        assert!(session_token(&jar1).is_none());

        // Second call behaves the same
        let (status2, _, body2) = signout(jar1).await;
        assert_eq!(status2, StatusCode::OK);
        assert_eq!(body2.message, "Sign Out Successful");
    }

    #[tokio::test]
    async fn test_signout_clears_existing_cookie() {
        let state = test_state().await;

        let (_, jar, _) = signup(
            State(state),
            CookieJar::new(),
            Json(signup_request("out@example.com")),
        )
        .await
        .unwrap();
        assert!(session_token(&jar).is_some());

        let (_, jar, _) = signout(jar).await;
        assert!(session_token(&jar).is_none());
    }
}
