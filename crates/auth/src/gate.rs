//! Admin gate: a pure predicate over (path, session).
//!
//! Every path under `/admin` (optionally behind a two-letter locale prefix,
//! e.g. `/ja/admin/...`) requires a session whose role is `admin`. Anything
//! else is sent to the sign-in page with a message and a callback URL.

use crate::Session;

pub const SIGN_IN_PATH: &str = "/signin";

const ADMIN_SEGMENT: &str = "admin";

/// Why a request was turned away from the admin area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No session token, or one that did not validate.
    MissingSession,
    /// Signed in, but without the `admin` role.
    NotAdmin,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::MissingSession => "Please sign in to access the admin area",
            DenialReason::NotAdmin => "You do not have permission to access the admin area",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRedirect {
    pub reason: DenialReason,
    pub callback_url: String,
}

impl SignInRedirect {
    /// `Location` value for the redirect response.
    pub fn location(&self) -> String {
        format!(
            "{SIGN_IN_PATH}?message={}&callbackUrl={}",
            urlencoding::encode(self.reason.message()),
            urlencoding::encode(&self.callback_url),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(SignInRedirect),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// Whether `path` falls under the admin area.
///
/// Matches `/admin`, `/admin/...`, `/<locale>/admin` and `/<locale>/admin/...`
/// where `<locale>` is two lowercase ASCII letters. The query string, if any,
/// is ignored.
pub fn is_admin_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.trim_start_matches('/').split('/');

    match segments.next() {
        Some(ADMIN_SEGMENT) => true,
        Some(first) if is_locale_segment(first) => segments.next() == Some(ADMIN_SEGMENT),
        _ => false,
    }
}

fn is_locale_segment(segment: &str) -> bool {
    segment.len() == 2 && segment.bytes().all(|b| b.is_ascii_lowercase())
}

/// Decide whether a request for `path` may proceed.
///
/// - No IO
/// - No panics
/// - Non-admin paths are always allowed
pub fn admin_gate(path: &str, session: Option<&Session>) -> GateDecision {
    if !is_admin_path(path) {
        return GateDecision::Allow;
    }

    let reason = match session {
        None => DenialReason::MissingSession,
        Some(s) if !s.is_admin() => DenialReason::NotAdmin,
        Some(_) => return GateDecision::Allow,
    };

    tracing::debug!(path, ?reason, "admin gate denied request");

    GateDecision::Redirect(SignInRedirect {
        reason,
        callback_url: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use proptest::prelude::*;
    use shopwise_core::UserId;

    fn session(role: Role) -> Session {
        Session {
            user_id: UserId::new(),
            role,
            username: "ops".to_string(),
            access_token: "t".to_string(),
        }
    }

    #[test]
    fn admin_paths_are_recognised() {
        assert!(is_admin_path("/admin"));
        assert!(is_admin_path("/admin/"));
        assert!(is_admin_path("/admin/products/42"));
        assert!(is_admin_path("/ja/admin"));
        assert!(is_admin_path("/en/admin/products?page=2"));
    }

    #[test]
    fn lookalike_paths_are_not_admin() {
        assert!(!is_admin_path("/"));
        assert!(!is_admin_path("/administrator"));
        assert!(!is_admin_path("/search?q=admin"));
        assert!(!is_admin_path("/tags/admin"));
        assert!(!is_admin_path("/products/admin-chair"));
        assert!(!is_admin_path("/eng/admin"));
    }

    #[test]
    fn missing_session_redirects_with_sign_in_message() {
        let decision = admin_gate("/admin/products", None);
        let GateDecision::Redirect(redirect) = decision else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.reason, DenialReason::MissingSession);
        assert_eq!(
            redirect.location(),
            "/signin?message=Please%20sign%20in%20to%20access%20the%20admin%20area&callbackUrl=%2Fadmin%2Fproducts"
        );
    }

    #[test]
    fn non_admin_role_redirects() {
        let s = session(Role::new("viewer"));
        let decision = admin_gate("/admin", Some(&s));
        assert!(matches!(
            decision,
            GateDecision::Redirect(SignInRedirect { reason: DenialReason::NotAdmin, .. })
        ));
    }

    #[test]
    fn admin_role_passes() {
        let s = session(Role::admin());
        assert!(admin_gate("/admin/products", Some(&s)).is_allowed());
    }

    #[test]
    fn public_paths_pass_without_session() {
        assert!(admin_gate("/search", None).is_allowed());
        assert!(admin_gate("/go/12", None).is_allowed());
    }

    proptest! {
        #[test]
        fn every_admin_subpath_is_gated(suffix in "[a-z0-9/_-]{0,24}", role in "[a-z]{1,8}") {
            let path = format!("/admin/{suffix}");
            prop_assert!(!admin_gate(&path, None).is_allowed());

            let s = session(Role::new(role.clone()));
            prop_assert_eq!(admin_gate(&path, Some(&s)).is_allowed(), role == "admin");
        }
    }
}
