//! Where the client gets its current session from.

use std::sync::RwLock;

use shopwise_auth::Session;

pub trait SessionStore: Send + Sync {
    fn current(&self) -> Option<Session>;
}

/// In-process session store for tools and tests; no persistence.
#[derive(Debug, Default)]
pub struct MockSessionStore {
    inner: RwLock<Option<Session>>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(Some(session)),
        }
    }

    pub fn sign_in(&self, session: Session) {
        if let Ok(mut s) = self.inner.write() {
            *s = Some(session);
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut s) = self.inner.write() {
            *s = None;
        }
    }
}

impl SessionStore for MockSessionStore {
    fn current(&self) -> Option<Session> {
        self.inner.read().ok().and_then(|s| s.clone())
    }
}
