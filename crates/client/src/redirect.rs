//! Affiliate redirect gate.
//!
//! One page id in, one navigation out. The gate announces the redirect,
//! asks a [`TokenService`] for the destination exactly once, then either
//! navigates or reports the error. No retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ApiClient, ClientError, FetchOptions};

/// Resolved partner URL for a page id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub page_id: u64,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("no affiliate destination for page {0}")]
    NotFound(u64),

    #[error("token service unavailable: {0}")]
    Unavailable(String),

    #[error("token service returned an unusable destination: {0}")]
    InvalidDestination(String),
}

impl From<ClientError> for RedirectError {
    fn from(err: ClientError) -> Self {
        RedirectError::Unavailable(err.to_string())
    }
}

/// Resolves affiliate page ids to destinations.
#[async_trait]
pub trait TokenService: Send + Sync {
    async fn resolve(&self, page_id: u64) -> Result<Destination, RedirectError>;
}

/// Redirect lifecycle callbacks. Both default to no-ops.
pub trait RedirectObserver: Send + Sync {
    fn on_redirect_start(&self, _page_id: u64) {}

    fn on_redirect_error(&self, _page_id: u64, _error: &RedirectError) {}
}

/// For callers that only care about the navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RedirectObserver for NoopObserver {}

/// Performs the actual navigation (browser location change, HTTP 302, ...).
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    Navigated(String),
    Failed,
}

#[derive(Debug, Clone)]
pub struct RedirectGate<T> {
    tokens: T,
}

impl<T: TokenService> RedirectGate<T> {
    pub fn new(tokens: T) -> Self {
        Self { tokens }
    }

    pub async fn redirect(
        &self,
        page_id: u64,
        observer: &dyn RedirectObserver,
        navigator: &dyn Navigator,
    ) -> RedirectOutcome {
        observer.on_redirect_start(page_id);

        match self.tokens.resolve(page_id).await {
            Ok(dest) => {
                tracing::info!(page_id, url = %dest.url, "affiliate redirect");
                navigator.navigate(&dest.url);
                RedirectOutcome::Navigated(dest.url)
            }
            Err(err) => {
                tracing::warn!(page_id, error = %err, "affiliate redirect failed");
                observer.on_redirect_error(page_id, &err);
                RedirectOutcome::Failed
            }
        }
    }
}

/// Token service backed by `GET /api/redirect/:page_id`.
#[derive(Debug, Clone)]
pub struct HttpTokenService {
    client: ApiClient,
}

impl HttpTokenService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenService for HttpTokenService {
    async fn resolve(&self, page_id: u64) -> Result<Destination, RedirectError> {
        let res = self
            .client
            .fetch_with_auth(
                reqwest::Method::GET,
                &format!("/api/redirect/{page_id}"),
                FetchOptions::anonymous(),
            )
            .await?;

        match res.status() {
            s if s.is_success() => {}
            reqwest::StatusCode::NOT_FOUND => return Err(RedirectError::NotFound(page_id)),
            s => return Err(RedirectError::Unavailable(format!("status {s}"))),
        }

        let dest: Destination = res
            .json()
            .await
            .map_err(|e| RedirectError::InvalidDestination(e.to_string()))?;
        if !(dest.url.starts_with("https://") || dest.url.starts_with("http://")) {
            return Err(RedirectError::InvalidDestination(dest.url));
        }
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTokens {
        result: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenService for FixedTokens {
        async fn resolve(&self, page_id: u64) -> Result<Destination, RedirectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Some(url) => Ok(Destination { page_id, url: url.clone() }),
                None => Err(RedirectError::NotFound(page_id)),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl RedirectObserver for Recorder {
        fn on_redirect_start(&self, page_id: u64) {
            self.events.lock().unwrap().push(format!("start:{page_id}"));
        }

        fn on_redirect_error(&self, page_id: u64, _error: &RedirectError) {
            self.events.lock().unwrap().push(format!("error:{page_id}"));
        }
    }

    impl Navigator for Recorder {
        fn navigate(&self, url: &str) {
            self.events.lock().unwrap().push(format!("navigate:{url}"));
        }
    }

    #[tokio::test]
    async fn start_fires_before_navigation() {
        let gate = RedirectGate::new(FixedTokens {
            result: Some("https://www.amazon.co.jp/dp/X".to_string()),
            calls: AtomicUsize::new(0),
        });
        let rec = Recorder::default();

        let outcome = gate.redirect(7, &rec, &rec).await;

        assert_eq!(outcome, RedirectOutcome::Navigated("https://www.amazon.co.jp/dp/X".to_string()));
        assert_eq!(rec.events(), vec!["start:7", "navigate:https://www.amazon.co.jp/dp/X"]);
    }

    #[tokio::test]
    async fn failure_reports_error_and_never_navigates_or_retries() {
        let gate = RedirectGate::new(FixedTokens {
            result: None,
            calls: AtomicUsize::new(0),
        });
        let rec = Recorder::default();

        let outcome = gate.redirect(9, &rec, &rec).await;

        assert_eq!(outcome, RedirectOutcome::Failed);
        assert_eq!(rec.events(), vec!["start:9", "error:9"]);
        assert_eq!(gate.tokens.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn callbacks_are_optional() {
        let gate = RedirectGate::new(FixedTokens {
            result: Some("https://item.rakuten.co.jp/shop/x/".to_string()),
            calls: AtomicUsize::new(0),
        });
        let nav = Recorder::default();

        let outcome = gate.redirect(3, &NoopObserver, &nav).await;
        assert_eq!(outcome, RedirectOutcome::Navigated("https://item.rakuten.co.jp/shop/x/".to_string()));
        assert_eq!(nav.events(), vec!["navigate:https://item.rakuten.co.jp/shop/x/"]);

        let failing = RedirectGate::new(FixedTokens {
            result: None,
            calls: AtomicUsize::new(0),
        });
        assert_eq!(failing.redirect(4, &NoopObserver, &nav).await, RedirectOutcome::Failed);
        assert_eq!(nav.events().len(), 1);
    }
}
