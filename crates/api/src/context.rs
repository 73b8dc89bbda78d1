use shopwise_auth::Session;

use crate::views::i18n::Locale;

/// Session resolved for a request.
///
/// Inserted by the session middleware on every request; `None` when no token
/// was presented or it failed validation.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn session(&self) -> Option<&Session> {
        self.0.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(Session::is_admin)
    }
}

/// Locale of an HTML page and how its links are prefixed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageLocale {
    locale: Locale,
    prefixed: bool,
}

impl PageLocale {
    /// Pages served without a locale segment (`/search`).
    pub fn unprefixed(locale: Locale) -> Self {
        Self { locale, prefixed: false }
    }

    /// Pages served under `/<code>/...`.
    pub fn prefixed(locale: Locale) -> Self {
        Self { locale, prefixed: true }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Link to `path` within the same locale.
    pub fn href(&self, path: &str) -> String {
        if self.prefixed {
            format!("/{}{}", self.locale.code(), path)
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_respects_prefix() {
        assert_eq!(PageLocale::unprefixed(Locale::Ja).href("/tags"), "/tags");
        assert_eq!(PageLocale::prefixed(Locale::Ja).href("/tags"), "/ja/tags");
    }
}
