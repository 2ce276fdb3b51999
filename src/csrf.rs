use axum_extra::extract::cookie::SignedCookieJar;
use cookie::{Cookie, Key, SameSite};

use crate::error::{AppError, AppResult};

pub const COOKIE_NAME: &str = "csrf_token";
pub const FIELD_NAME: &str = "csrf_token";

/// Signing key for the token cookie. Without a secret the key is random, so
/// forms rendered before a restart stop validating.
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => Key::derive_from(secret.as_bytes()),
        None => {
            tracing::warn!("no SECRET_KEY provided, using a random cookie signing key");
            Key::generate()
        },
    }
}

/// Token for the forms on this page; reuses the browser's cookie when present.
pub fn issue(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        return (jar, cookie.value().to_string());
    }

    let token = uuid::Uuid::new_v4().simple().to_string();
    let cookie = Cookie::build((COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(7))
        .build();
    (jar.add(cookie), token)
}

pub fn verify(jar: &SignedCookieJar, submitted: &str) -> AppResult<()> {
    match jar.get(COOKIE_NAME) {
        Some(cookie) if !submitted.is_empty() && cookie.value() == submitted => Ok(()),
        _ => {
            tracing::debug!("rejected form with missing or mismatched csrf token");
            Err(AppError::Forbidden(
                "This form has expired. Go back, reload the page and try again.".to_string(),
            ))
        },
    }
}
