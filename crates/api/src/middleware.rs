use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

use shopwise_auth::{GateDecision, Session, TokenValidator, admin_gate};

use crate::context::CurrentSession;

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Clone)]
pub struct SessionState {
    pub tokens: Arc<dyn TokenValidator>,
}

/// Resolve the request's session and apply the admin gate.
///
/// Runs on every request. Gated paths without an admin session get a
/// `303 See Other` to the sign-in page; everything else continues with a
/// [`CurrentSession`] extension.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session = resolve_session(req.headers(), state.tokens.as_ref(), Utc::now());

    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.uri().path());

    if let GateDecision::Redirect(redirect) = admin_gate(path, session.as_ref()) {
        tracing::info!(path, reason = ?redirect.reason, "redirecting to sign-in");
        return Redirect::to(&redirect.location()).into_response();
    }

    req.extensions_mut().insert(CurrentSession(session));
    next.run(req).await
}

/// First valid session among the `session_token` cookie and a bearer header.
fn resolve_session(headers: &HeaderMap, tokens: &dyn TokenValidator, now: DateTime<Utc>) -> Option<Session> {
    [cookie_token(headers), bearer_token(headers)]
        .into_iter()
        .flatten()
        .find_map(|token| match tokens.validate(token, now) {
            Ok(claims) => Some(Session::from_claims(claims, token)),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring invalid session token");
                None
            }
        })
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use shopwise_auth::{Hs256Tokens, Role, SessionClaims};
    use shopwise_core::UserId;

    fn token(tokens: &Hs256Tokens, username: &str) -> String {
        let claims = SessionClaims::new(UserId::new(), username, Role::admin(), Utc::now(), chrono::Duration::minutes(5));
        tokens.issue(&claims).unwrap()
    }

    fn headers(cookie: Option<&str>, bearer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(c) = cookie {
            headers.insert(header::COOKIE, HeaderValue::from_str(c).unwrap());
        }
        if let Some(b) = bearer {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(b).unwrap());
        }
        headers
    }

    fn username(headers: &HeaderMap, tokens: &Hs256Tokens) -> Option<String> {
        resolve_session(headers, tokens, Utc::now()).map(|s| s.username)
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let tokens = Hs256Tokens::new("secret");
        let h = headers(
            Some(&format!("theme=dark; session_token={}", token(&tokens, "cookie"))),
            Some(&format!("Bearer {}", token(&tokens, "bearer"))),
        );
        assert_eq!(username(&h, &tokens).as_deref(), Some("cookie"));
    }

    #[test]
    fn bearer_used_without_cookie() {
        let tokens = Hs256Tokens::new("secret");
        let h = headers(None, Some(&format!("Bearer  {} ", token(&tokens, "bearer"))));
        assert_eq!(username(&h, &tokens).as_deref(), Some("bearer"));
    }

    #[test]
    fn stale_cookie_falls_back_to_bearer() {
        let tokens = Hs256Tokens::new("secret");
        let rotated = Hs256Tokens::new("old-secret");
        let h = headers(
            Some(&format!("session_token={}", token(&rotated, "stale"))),
            Some(&format!("Bearer {}", token(&tokens, "bearer"))),
        );
        assert_eq!(username(&h, &tokens).as_deref(), Some("bearer"));

        let h = headers(Some("session_token=garbage"), None);
        assert_eq!(username(&h, &tokens), None);
    }

    #[test]
    fn empty_or_foreign_values_are_absent() {
        let h = headers(Some("session_token="), Some("Basic Zm9v"));
        assert_eq!(cookie_token(&h), None);
        assert_eq!(bearer_token(&h), None);
        assert_eq!(username(&h, &Hs256Tokens::new("secret")), None);
    }
}
