//! Sign-in and sign-out for the admin account.

use std::sync::Arc;

use axum::{
    Form,
    extract::{Extension, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use shopwise_auth::{Role, SessionClaims, verify_password};
use shopwise_core::UserId;

use crate::app::services::AppServices;
use crate::context::PageLocale;
use crate::middleware::SESSION_COOKIE;
use crate::views::pages;

#[derive(Debug, Default, Deserialize)]
pub struct SignInQuery {
    pub message: Option<String>,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
    #[serde(rename = "callbackUrl", default)]
    pub callback_url: Option<String>,
}

/// Local path to return to after sign-in; anything else becomes the admin
/// dashboard.
fn safe_callback(raw: Option<&str>, page: &PageLocale) -> String {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => page.href("/admin"),
    }
}

fn session_cookie(value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub async fn sign_in_form(
    Extension(page): Extension<PageLocale>,
    query: Option<Query<SignInQuery>>,
) -> Html<String> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let callback = safe_callback(query.callback_url.as_deref(), &page);
    Html(pages::sign_in(&page, query.message.as_deref(), &callback, false))
}

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(page): Extension<PageLocale>,
    Form(form): Form<SignInForm>,
) -> Response {
    let callback = safe_callback(form.callback_url.as_deref(), &page);
    let rejected = || (StatusCode::UNAUTHORIZED, Html(pages::sign_in(&page, None, &callback, true))).into_response();

    let Some(admin) = services.config.admin.clone() else {
        tracing::warn!("sign-in attempted but no admin account is configured");
        return rejected();
    };

    // bcrypt blocks; run it on the blocking pool.
    let password = form.password;
    let hash = admin.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await;

    let ok = match verified {
        Ok(Ok(matches)) => matches && form.username == admin.username,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "admin password hash could not be checked");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "password check task failed");
            false
        }
    };
    if !ok {
        tracing::info!(username = %form.username, "sign-in rejected");
        return rejected();
    }

    let ttl = services.config.session_ttl;
    let claims = SessionClaims::new(UserId::new(), admin.username.clone(), Role::admin(), Utc::now(), ttl);
    let token = match services.tokens.issue(&claims) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue session token");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(username = %admin.username, "admin signed in");
    let cookie = session_cookie(&token, ttl.num_seconds(), services.config.secure_cookies);
    ([(header::SET_COOKIE, cookie)], Redirect::to(&callback)).into_response()
}

pub async fn sign_out(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let cookie = session_cookie("", 0, services.config.secure_cookies);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::i18n::Locale;

    #[test]
    fn only_local_callbacks_are_kept() {
        let page = PageLocale::prefixed(Locale::Ja);
        assert_eq!(safe_callback(Some("/admin/products/1?x=1"), &page), "/admin/products/1?x=1");
        assert_eq!(safe_callback(Some("https://evil.example"), &page), "/ja/admin");
        assert_eq!(safe_callback(Some("//evil.example"), &page), "/ja/admin");
        assert_eq!(safe_callback(Some("/\\evil.example"), &page), "/ja/admin");
        assert_eq!(safe_callback(None, &page), "/ja/admin");
    }

    #[test]
    fn cookie_attributes() {
        assert_eq!(
            session_cookie("abc", 3600, false),
            "session_token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        assert!(session_cookie("", 0, true).ends_with("Max-Age=0; Secure"));
    }
}
