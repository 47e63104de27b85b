//! Session cookie construction.

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::AuthConfig;

/// Session token cookie name
pub const SESSION_COOKIE: &str = "token";

/// Build the session cookie carrying a signed token.
pub fn session_cookie(token: String, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::minutes(config.cookie_max_age_minutes))
        .build()
}

/// Build a removal cookie that clears the session cookie on the client.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build()
}
